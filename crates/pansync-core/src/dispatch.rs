//! Bounded-pool dispatch of fetch workers.
//!
//! Runs one fetch per plan entry across at most `max_threads` OS threads.
//! Workers pull from a shared deque and send outcomes over a channel, so
//! results arrive in completion order and one failure never blocks or
//! cancels the rest of the batch.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use crate::config::SyncConfig;
use crate::fetch::{self, DownloadOutcome};
use crate::planner::DownloadPlan;
use crate::progress::ProgressSink;

/// Downloads every plan entry and returns one outcome per entry, in
/// completion order. Joins all workers before returning.
pub fn run_all(
    plan: &DownloadPlan,
    cfg: &SyncConfig,
    sink: Arc<dyn ProgressSink>,
) -> Vec<DownloadOutcome> {
    let count = plan.len();
    if count == 0 {
        return Vec::new();
    }

    let work: Arc<Mutex<VecDeque<(String, String)>>> = Arc::new(Mutex::new(
        plan.entries
            .iter()
            .map(|(id, url)| (id.clone(), url.clone()))
            .collect(),
    ));
    let (tx, rx) = mpsc::channel();
    let num_workers = cfg.max_threads.max(1).min(count);

    let mut handles = Vec::with_capacity(num_workers);
    for _ in 0..num_workers {
        let work = Arc::clone(&work);
        let tx = tx.clone();
        let cfg = cfg.clone();
        let sink = Arc::clone(&sink);
        handles.push(thread::spawn(move || loop {
            let (id, url) = match work.lock().unwrap().pop_front() {
                Some(entry) => entry,
                None => break,
            };
            let outcome = fetch::fetch_one(&id, &url, &cfg, sink.as_ref());
            if tx.send(outcome).is_err() {
                break;
            }
        }));
    }
    drop(tx);

    let mut outcomes = Vec::with_capacity(count);
    for outcome in rx {
        outcomes.push(outcome);
    }

    for handle in handles {
        if handle.join().is_err() {
            tracing::error!("fetch worker panicked");
        }
    }

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    tracing::info!(
        succeeded = outcomes.len() - failed,
        failed,
        "batch finished"
    );
    outcomes
}
