//! Reconciliation planning.
//!
//! Combines the inspection report with the remote mapping into the set of
//! identifiers to fetch this run. The plan is derived fresh every run and
//! never persisted.

use std::collections::{BTreeMap, BTreeSet};

use crate::archive::ArchiveReport;
use crate::catalog::FileMapping;
use crate::config::SyncConfig;

/// Downloads selected for one run, restricted to mapped identifiers.
#[derive(Debug, Default, Clone)]
pub struct DownloadPlan {
    /// Identifier to URL, for every selected identifier the listing knows.
    pub entries: BTreeMap<String, String>,
    /// Selected identifiers that had no mapping entry and were dropped.
    pub unmapped: usize,
    /// Size of the full mapping, for the "N of M" report.
    pub total_mapped: usize,
}

impl DownloadPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Computes the download plan for this run.
///
/// Selected identifiers are the re-fetch set from the inspector, the whole
/// recency window `[max - recency_window, max]` (even where no local file
/// existed), and the numeric tail `[max, catalog_upper_bound)`. When the
/// archive yields no numeric max the tail starts at `bootstrap_floor`
/// instead, or is skipped entirely when that is unset.
pub fn plan(mapping: &FileMapping, report: &ArchiveReport, cfg: &SyncConfig) -> DownloadPlan {
    let mut wanted: BTreeSet<String> = report.refetch.clone();

    if let Some(max) = report.max_numeric {
        for n in max.saturating_sub(cfg.recency_window)..=max {
            wanted.insert(n.to_string());
        }
    }

    let tail_floor = report.max_numeric.or(cfg.bootstrap_floor);
    if let Some(from) = tail_floor {
        for n in from..cfg.catalog_upper_bound {
            wanted.insert(n.to_string());
        }
    } else {
        tracing::debug!("no numeric max and no bootstrap floor, skipping tail extension");
    }

    let mut entries = BTreeMap::new();
    let mut unmapped = 0usize;
    for id in wanted {
        match mapping.get(&id) {
            Some(url) => {
                entries.insert(id, url.clone());
            }
            None => unmapped += 1,
        }
    }
    if unmapped > 0 {
        tracing::debug!(unmapped, "dropped selected identifiers absent from the listing");
    }

    let plan = DownloadPlan {
        entries,
        unmapped,
        total_mapped: mapping.len(),
    };
    tracing::info!("{} of {} files to download", plan.len(), plan.total_mapped);
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(ids: &[&str]) -> FileMapping {
        ids.iter()
            .map(|id| (id.to_string(), format!("https://example.com/{id}.fa.gz")))
            .collect()
    }

    fn report(refetch: &[&str], max_numeric: Option<u64>) -> ArchiveReport {
        ArchiveReport {
            refetch: refetch.iter().map(|s| s.to_string()).collect(),
            max_numeric,
            delete_failures: BTreeSet::new(),
        }
    }

    fn test_config(upper: u64) -> SyncConfig {
        SyncConfig {
            catalog_upper_bound: upper,
            recency_window: 2,
            ..SyncConfig::default()
        }
    }

    #[test]
    fn plan_is_subset_of_mapping() {
        let mapping = mapping(&["1", "2", "3"]);
        let report = report(&["2", "99"], Some(7));
        let plan = plan(&mapping, &report, &test_config(12));
        for id in plan.entries.keys() {
            assert!(mapping.contains_key(id));
        }
        // "99" and the unmapped tail 7..12 are dropped, "2" survives.
        assert_eq!(plan.entries.keys().collect::<Vec<_>>(), ["2"]);
        assert_eq!(plan.total_mapped, 3);
    }

    #[test]
    fn tail_extends_from_max_inclusive_to_upper_exclusive() {
        let mapping = mapping(&["12", "13", "14", "15"]);
        let report = report(&[], Some(12));
        let plan = plan(&mapping, &report, &test_config(15));
        assert_eq!(
            plan.entries.keys().cloned().collect::<Vec<_>>(),
            ["12", "13", "14"]
        );
    }

    #[test]
    fn window_is_replanned_even_without_local_files() {
        // Window files may never have been downloaded at all.
        let mapping = mapping(&["8", "9", "10"]);
        let report = report(&[], Some(10));
        let plan = plan(&mapping, &report, &test_config(0));
        assert_eq!(
            plan.entries.keys().cloned().collect::<Vec<_>>(),
            ["10", "8", "9"]
        );
    }

    #[test]
    fn tail_skipped_when_max_at_or_above_upper_bound() {
        let mapping = mapping(&["1", "2"]);
        let report = report(&[], Some(20));
        let plan = plan(&mapping, &report, &test_config(15));
        assert!(plan.is_empty());
    }

    #[test]
    fn cold_run_without_bootstrap_floor_has_no_tail() {
        let mapping = mapping(&["0", "1", "2"]);
        let report = report(&[], None);
        let plan = plan(&mapping, &report, &test_config(3));
        assert!(plan.is_empty());
    }

    #[test]
    fn cold_run_with_bootstrap_floor_extends_tail() {
        let mapping = mapping(&["0", "1", "2"]);
        let report = report(&[], None);
        let cfg = SyncConfig {
            bootstrap_floor: Some(0),
            ..test_config(3)
        };
        let plan = plan(&mapping, &report, &cfg);
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn unmapped_count_is_reported() {
        let mapping = mapping(&["5"]);
        let report = report(&["5", "6", "7"], None);
        let plan = plan(&mapping, &report, &test_config(0));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.unmapped, 2);
    }

    #[test]
    fn undersized_and_window_refetch_combine_with_tail() {
        // Archive held 10 (full) and 11 (undersized); 11 was deleted as
        // undersized, leaving max = 10, and 10 fell inside the window.
        let mapping = mapping(&["10", "11", "12", "13", "14"]);
        let report = report(&["10", "11"], Some(10));
        let plan = plan(&mapping, &report, &test_config(15));
        assert_eq!(
            plan.entries.keys().cloned().collect::<Vec<_>>(),
            ["10", "11", "12", "13", "14"]
        );
    }
}
