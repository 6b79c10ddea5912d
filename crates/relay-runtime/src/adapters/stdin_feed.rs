//! # Line Feed
//!
//! Stands in for the guardian gossip listener in local mode: one hex-encoded
//! VAA per line, blank lines and `#` comments skipped.
//!
//! Reading runs on a plain thread. A blocking stdin read would otherwise
//! hold the tokio runtime open at shutdown.

use bytes::Bytes;
use std::io::BufRead;
use std::thread;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Counts from one `read_lines` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    pub forwarded: u64,
    pub skipped: u64,
    pub invalid: u64,
}

/// Forward every hex line of `reader` to `tx` until EOF or the receiver is
/// dropped. Blocks; call from a non-async thread.
pub fn read_lines<R: BufRead>(reader: R, tx: &mpsc::Sender<Bytes>) -> LineStats {
    let mut stats = LineStats::default();

    for (lineno, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Input read failed, stopping feed");
                break;
            }
        };
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            stats.skipped += 1;
            continue;
        }

        let digits = text.strip_prefix("0x").unwrap_or(text);
        match hex::decode(digits) {
            Ok(raw) => {
                if tx.blocking_send(Bytes::from(raw)).is_err() {
                    debug!("Gossip channel closed, stopping feed");
                    break;
                }
                stats.forwarded += 1;
            }
            Err(e) => {
                stats.invalid += 1;
                warn!(line = lineno + 1, error = %e, "Skipping non-hex input line");
            }
        }
    }
    stats
}

/// Spawn a thread feeding stdin into `tx`.
pub fn spawn_stdin_feed(tx: mpsc::Sender<Bytes>) -> std::io::Result<thread::JoinHandle<LineStats>> {
    thread::Builder::new()
        .name("stdin-feed".to_string())
        .spawn(move || {
            let stats = read_lines(std::io::stdin().lock(), &tx);
            debug!(forwarded = stats.forwarded, invalid = stats.invalid, "stdin closed");
            stats
        })
}
