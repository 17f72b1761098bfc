//! Listing-source boundary.
//!
//! The engine only depends on [`CatalogSource`]; how the mapping is obtained
//! (a scraped listing, a manifest file, a fixture) stays outside the core.

use anyhow::{bail, Result};
use std::collections::BTreeMap;

/// Identifier to source-URL mapping produced by a listing source.
pub type FileMapping = BTreeMap<String, String>;

/// A source of catalog snapshots.
pub trait CatalogSource {
    /// Current view of the catalog. Lazily rendered listings may return a
    /// partial mapping that grows on subsequent calls.
    fn snapshot(&mut self) -> Result<FileMapping>;
}

/// Polls `source` until two consecutive snapshots are identical and returns
/// the stable mapping.
///
/// Lazily rendered listings grow while they are read, so a snapshot is
/// trusted only once it stops changing. Fails after `max_polls` snapshots
/// without convergence so a stalled listing cannot spin forever.
pub fn harvest_until_stable(
    source: &mut dyn CatalogSource,
    max_polls: u32,
) -> Result<FileMapping> {
    let mut last = source.snapshot()?;
    for poll in 1..max_polls {
        let next = source.snapshot()?;
        if next == last {
            tracing::debug!(polls = poll + 1, entries = next.len(), "listing stabilized");
            return Ok(next);
        }
        last = next;
    }
    bail!("listing did not stabilize after {} polls", max_polls)
}
