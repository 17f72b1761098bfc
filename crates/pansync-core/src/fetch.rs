//! Single-file fetch worker.
//!
//! Streams one HTTP GET to the archive directory. Bytes go to a `.part`
//! file that is renamed into place on success, so a truncated download is
//! never left under the final name. Every failure is captured into the
//! outcome at the worker boundary; nothing propagates to sibling workers.

use std::cell::{Cell, RefCell};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::SyncConfig;
use crate::naming;
use crate::progress::{self, ProgressSink};

/// Classified failure of one download attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// libcurl failure (timeout, connection reset, TLS, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Non-2xx response status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Transfer ended before the advertised size was reached.
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },
    /// Local filesystem failure (create, write, rename).
    #[error("disk: {0}")]
    Disk(#[source] std::io::Error),
}

/// Details of a completed transfer.
#[derive(Debug, Clone)]
pub struct Fetched {
    /// Final path of the downloaded file.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes: u64,
    /// Advertised total size; 0 when the server sent no Content-Length.
    pub expected_bytes: u64,
}

/// Terminal result of one file's download attempt. Failures are data here,
/// not errors: the dispatcher collects them and the batch continues.
#[derive(Debug)]
pub struct DownloadOutcome {
    pub id: String,
    pub url: String,
    pub elapsed: Duration,
    pub result: Result<Fetched, FetchError>,
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Downloads one identifier into `cfg.save_dir`.
///
/// Never returns an error: network, protocol, and disk failures are all
/// converted into a failure outcome carrying the identifier and URL.
pub fn fetch_one(
    id: &str,
    url: &str,
    cfg: &SyncConfig,
    sink: &dyn ProgressSink,
) -> DownloadOutcome {
    let slot = progress::display_slot(id);
    let started = Instant::now();
    sink.start(id, slot);
    tracing::info!(id, url, "download started");

    let result = transfer(id, url, slot, cfg, sink);

    sink.finish(id, slot);
    let elapsed = started.elapsed();
    match &result {
        Ok(f) => tracing::info!(
            id,
            bytes = f.bytes,
            "downloaded {} in {:.2} seconds",
            f.path.display(),
            elapsed.as_secs_f64()
        ),
        Err(e) => tracing::warn!(id, url, error = %e, "download failed"),
    }

    DownloadOutcome {
        id: id.to_string(),
        url: url.to_string(),
        elapsed,
        result,
    }
}

fn transfer(
    id: &str,
    url: &str,
    slot: usize,
    cfg: &SyncConfig,
    sink: &dyn ProgressSink,
) -> Result<Fetched, FetchError> {
    fs::create_dir_all(&cfg.save_dir).map_err(FetchError::Disk)?;
    let file_name = naming::dest_filename(id, url);
    let final_path = cfg.save_dir.join(&file_name);
    let part_path = cfg.save_dir.join(format!("{file_name}.part"));

    // State shared between the header and write callbacks.
    let status = Cell::new(0u32);
    let total = Cell::new(0u64);
    let written = Cell::new(0u64);
    let part: RefCell<Option<File>> = RefCell::new(None);
    let disk_error: RefCell<Option<std::io::Error>> = RefCell::new(None);

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.useragent(&cfg.user_agent)?;
    easy.connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))?;
    // Stall detection stands in for a response timeout; there is intentionally
    // no total-transfer timeout.
    easy.low_speed_limit(1)?;
    easy.low_speed_time(Duration::from_secs(cfg.connect_timeout_secs))?;
    easy.buffer_size(cfg.chunk_size_bytes)?;

    let performed = {
        let mut xfer = easy.transfer();
        xfer.header_function(|line| {
            let line = std::str::from_utf8(line).unwrap_or("").trim();
            if line.starts_with("HTTP/") {
                // A new response begins; redirect hops reset the parsed state.
                status.set(parse_status_line(line));
                total.set(0);
            } else if let Some((name, value)) = line.split_once(':') {
                if name.trim().eq_ignore_ascii_case("content-length") {
                    if let Ok(n) = value.trim().parse::<u64>() {
                        total.set(n);
                    }
                }
            }
            true
        })?;
        xfer.write_function(|data| {
            if data.is_empty() {
                return Ok(0);
            }
            if status.get() < 200 || status.get() >= 300 {
                // Never write an error body to disk; aborts the transfer.
                return Ok(0);
            }
            let mut guard = part.borrow_mut();
            if guard.is_none() {
                match File::create(&part_path) {
                    Ok(f) => *guard = Some(f),
                    Err(e) => {
                        disk_error.replace(Some(e));
                        return Ok(0);
                    }
                }
            }
            let Some(file) = guard.as_mut() else {
                return Ok(0);
            };
            if let Err(e) = file.write_all(data) {
                disk_error.replace(Some(e));
                return Ok(0);
            }
            written.set(written.get() + data.len() as u64);
            sink.advance(id, slot, written.get(), total.get());
            Ok(data.len())
        })?;
        xfer.perform()
    };

    let verdict = evaluate(
        performed,
        status.get(),
        total.get(),
        written.get(),
        disk_error.into_inner(),
    );

    match verdict {
        Ok(()) => {
            let file = match part.into_inner() {
                Some(f) => f,
                // Empty body: the write callback never ran, create the file now.
                None => File::create(&part_path).map_err(FetchError::Disk)?,
            };
            file.sync_all().map_err(FetchError::Disk)?;
            drop(file);
            fs::rename(&part_path, &final_path).map_err(FetchError::Disk)?;
            Ok(Fetched {
                path: final_path,
                bytes: written.get(),
                expected_bytes: total.get(),
            })
        }
        Err(e) => {
            if part.into_inner().is_some() {
                if let Err(rm) = fs::remove_file(&part_path) {
                    tracing::debug!(path = %part_path.display(), error = %rm, "could not remove partial file");
                }
            }
            Err(e)
        }
    }
}

/// Folds the curl result, response status, byte counts, and any recorded
/// disk error into one verdict for the transfer.
fn evaluate(
    performed: Result<(), curl::Error>,
    status: u32,
    total: u64,
    written: u64,
    disk_error: Option<std::io::Error>,
) -> Result<(), FetchError> {
    if let Some(e) = disk_error {
        return Err(FetchError::Disk(e));
    }
    match performed {
        Ok(()) => {
            if !(200..300).contains(&status) {
                return Err(FetchError::Http(status));
            }
            if total > 0 && written != total {
                return Err(FetchError::PartialTransfer {
                    expected: total,
                    received: written,
                });
            }
            Ok(())
        }
        Err(e) => {
            // An aborted write on a non-2xx body surfaces as a curl write
            // error; the HTTP status is the real failure.
            if e.is_write_error() && !(200..300).contains(&status) {
                Err(FetchError::Http(status))
            } else {
                Err(FetchError::Curl(e))
            }
        }
    }
}

/// Status code out of a line like `HTTP/1.1 404 Not Found`; 0 if malformed.
fn parse_status_line(line: &str) -> u32 {
    line.split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or(0)
}
