//! Progress reporting seam between fetch workers and whatever renders them.
//!
//! Workers run in parallel, so each transfer gets a stable display slot and
//! renderers keep concurrent indicators on distinct lines. The sink is
//! injected so tests can substitute a recording or no-op implementation.

/// Display slots available to concurrent transfers.
pub const SLOT_COUNT: usize = 1000;

/// Receives progress events from fetch workers. Implementations must be
/// callable from multiple worker threads at once.
pub trait ProgressSink: Send + Sync {
    /// A worker began the transfer for `id`.
    fn start(&self, id: &str, slot: usize);

    /// Cumulative bytes written for `id`. `total_bytes` is 0 while the server
    /// has not advertised a size.
    fn advance(&self, id: &str, slot: usize, bytes_done: u64, total_bytes: u64);

    /// The transfer for `id` reached a terminal state (success or failure).
    fn finish(&self, id: &str, slot: usize);
}

/// Sink that discards everything. Used by tests and non-interactive runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn start(&self, _id: &str, _slot: usize) {}
    fn advance(&self, _id: &str, _slot: usize, _bytes_done: u64, _total_bytes: u64) {}
    fn finish(&self, _id: &str, _slot: usize) {}
}

/// Stable display slot for an identifier: numeric identifiers are spread by
/// value, non-numeric identifiers are pinned to slot 0.
pub fn display_slot(id: &str) -> usize {
    id.parse::<u64>()
        .map(|n| (n % SLOT_COUNT as u64) as usize)
        .unwrap_or(0)
}
