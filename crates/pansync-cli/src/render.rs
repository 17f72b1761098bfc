//! Terminal progress rendering with indicatif.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;

use pansync_core::progress::ProgressSink;

/// One progress bar per in-flight transfer. `MultiProgress` keeps concurrent
/// bars on distinct lines; the display slot is shown as a stable prefix.
pub struct IndicatifSink {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl IndicatifSink {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for IndicatifSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for IndicatifSink {
    fn start(&self, id: &str, slot: usize) {
        let bar = self.multi.add(ProgressBar::new(0));
        bar.set_style(
            ProgressStyle::with_template(
                "{prefix:>5} {msg:20!} [{bar:40.cyan/blue}] {bytes}/{total_bytes} @ {bytes_per_sec}",
            )
            .expect("progress template is valid")
            .progress_chars("=> "),
        );
        bar.set_prefix(format!("[{slot:>3}]"));
        bar.set_message(id.to_string());
        self.bars.lock().unwrap().insert(id.to_string(), bar);
    }

    fn advance(&self, id: &str, _slot: usize, bytes_done: u64, total_bytes: u64) {
        if let Some(bar) = self.bars.lock().unwrap().get(id) {
            if total_bytes > 0 && bar.length() != Some(total_bytes) {
                bar.set_length(total_bytes);
            }
            bar.set_position(bytes_done);
        }
    }

    fn finish(&self, id: &str, _slot: usize) {
        if let Some(bar) = self.bars.lock().unwrap().remove(id) {
            bar.finish_and_clear();
            self.multi.remove(&bar);
        }
    }
}
