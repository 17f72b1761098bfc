//! `pansync plan`: show what the next sync would download.

use anyhow::Result;
use std::path::Path;

use pansync_core::catalog::harvest_until_stable;
use pansync_core::config::SyncConfig;
use pansync_core::{archive, planner};

use crate::manifest::ManifestSource;

pub fn run_plan(cfg: &SyncConfig, manifest: &Path) -> Result<()> {
    let mut source = ManifestSource::new(manifest);
    let mapping = harvest_until_stable(&mut source, cfg.max_catalog_polls)?;

    let report = archive::inspect(&cfg.save_dir, cfg)?;
    let plan = planner::plan(&mapping, &report, cfg);

    if plan.is_empty() {
        println!("Nothing to download.");
    } else {
        println!("{:<10} URL", "ID");
        for (id, url) in &plan.entries {
            println!("{id:<10} {url}");
        }
    }
    println!(
        "{} of {} files to download ({} unmapped dropped)",
        plan.len(),
        plan.total_mapped,
        plan.unmapped
    );
    Ok(())
}
