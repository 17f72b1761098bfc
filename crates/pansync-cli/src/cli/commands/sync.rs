//! `pansync sync`: reconcile the local archive and download what is missing.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use pansync_core::catalog::harvest_until_stable;
use pansync_core::config::SyncConfig;
use pansync_core::{archive, dispatch, planner};

use crate::manifest::ManifestSource;
use crate::render::IndicatifSink;

pub fn run_sync(cfg: &SyncConfig, manifest: &Path, dry_run: bool) -> Result<()> {
    let mut source = ManifestSource::new(manifest);
    let mapping = harvest_until_stable(&mut source, cfg.max_catalog_polls)?;

    let report = archive::inspect(&cfg.save_dir, cfg)?;
    if !report.delete_failures.is_empty() {
        eprintln!(
            "warning: {} stale file(s) could not be removed and were left out of the plan",
            report.delete_failures.len()
        );
    }

    let plan = planner::plan(&mapping, &report, cfg);
    println!("{} of {} files to download", plan.len(), plan.total_mapped);

    if dry_run {
        for id in plan.entries.keys() {
            println!("  {id}");
        }
        return Ok(());
    }
    if plan.is_empty() {
        println!("Archive is up to date.");
        return Ok(());
    }

    let sink = Arc::new(IndicatifSink::new());
    let outcomes = dispatch::run_all(&plan, cfg, sink);

    let mut failed = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(fetched) => println!(
                "Downloaded: {} in {:.2} seconds",
                fetched.path.display(),
                outcome.elapsed.as_secs_f64()
            ),
            Err(e) => {
                failed += 1;
                println!("Failed: {} ({}): {}", outcome.id, outcome.url, e);
            }
        }
    }
    println!("{} succeeded, {} failed", outcomes.len() - failed, failed);

    if failed > 0 {
        anyhow::bail!("{failed} download(s) failed");
    }
    Ok(())
}
