//! JSON manifest listing source.
//!
//! Harvesting the remote listing (scrolling, DOM scraping) is a separate
//! tool; it leaves behind a JSON object of identifier to URL, which this
//! source replays as catalog snapshots.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use pansync_core::catalog::{CatalogSource, FileMapping};

pub struct ManifestSource {
    path: PathBuf,
}

impl ManifestSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl CatalogSource for ManifestSource {
    fn snapshot(&mut self) -> Result<FileMapping> {
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read manifest {}", self.path.display()))?;
        let mapping: FileMapping = serde_json::from_str(&data)
            .context("manifest must be a JSON object mapping identifiers to URLs")?;
        Ok(mapping)
    }
}
