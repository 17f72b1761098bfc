//! Local archive inspection.
//!
//! Classifies existing files before planning: undersized files are truncated
//! leftovers and are removed, and files in the recency window are removed
//! regardless of size because the listing may still be appending to them
//! upstream. Removal happens here, ahead of planning, so a fresh download
//! never lands next to a stale file at the same path.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SyncConfig;
use crate::naming;

/// Outcome of one inspection pass over the archive directory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Identifiers whose on-disk file was removed and must be fetched again.
    pub refetch: BTreeSet<String>,
    /// Largest numeric identifier among files that survived the undersized
    /// pass. `None` for an empty (or all-deleted, or all-non-numeric) archive.
    pub max_numeric: Option<u64>,
    /// Identifiers whose stale file could not be removed. Kept out of
    /// `refetch`: re-downloading next to an undeletable truncated file would
    /// desynchronize the plan from the disk state.
    pub delete_failures: BTreeSet<String>,
}

/// Scans `dir` and removes files that must be fetched again.
///
/// A missing directory is an empty archive, not an error. Entries without
/// the configured suffix or without an identifier prefix are skipped. The
/// numeric max is computed only after the undersized pass so deleted files
/// no longer count toward it.
pub fn inspect(dir: &Path, cfg: &SyncConfig) -> Result<ArchiveReport> {
    let mut report = ArchiveReport::default();
    if !dir.exists() {
        tracing::debug!(dir = %dir.display(), "archive directory missing, treating as empty");
        return Ok(report);
    }

    let mut survivors: Vec<(String, PathBuf)> = Vec::new();
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read archive directory {}", dir.display()))?;
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "unreadable directory entry, skipping");
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(&cfg.file_suffix) {
            continue;
        }
        let Some(id) = naming::identifier_prefix(&name) else {
            tracing::debug!(file = %name, "no identifier prefix, skipping");
            continue;
        };
        let size = match entry.metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "could not stat file, skipping");
                continue;
            }
        };

        if size <= cfg.completion_threshold_bytes {
            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    tracing::info!(file = %name, size, "deleted undersized file");
                    report.refetch.insert(id.to_string());
                }
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "could not delete undersized file");
                    report.delete_failures.insert(id.to_string());
                }
            }
        } else {
            survivors.push((id.to_string(), entry.path()));
        }
    }

    report.max_numeric = survivors
        .iter()
        .filter_map(|(id, _)| id.parse::<u64>().ok())
        .max();

    // Recency window: [max - recency_window, max], both bounds inclusive.
    if let Some(max) = report.max_numeric {
        let low = max.saturating_sub(cfg.recency_window);
        for (id, path) in &survivors {
            let Ok(n) = id.parse::<u64>() else { continue };
            if n < low || n > max {
                continue;
            }
            match fs::remove_file(path) {
                Ok(()) => {
                    tracing::info!(file = %path.display(), "deleted file in recency window");
                    report.refetch.insert(id.clone());
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "could not delete file in recency window");
                    report.delete_failures.insert(id.clone());
                }
            }
        }
    }

    Ok(report)
}
