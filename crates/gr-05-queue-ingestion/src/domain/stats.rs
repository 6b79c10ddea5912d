//! Consumer counters.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct ConsumerStats {
    /// Envelopes handed to the handler
    pub received: AtomicU64,
    /// Envelopes acknowledged (success or terminal)
    pub acked: AtomicU64,
    /// Terminal handler failures
    pub terminal: AtomicU64,
    /// Retryable handler failures left for redelivery
    pub retryable: AtomicU64,
    /// Failed receive calls
    pub receive_errors: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStatsSnapshot {
    pub received: u64,
    pub acked: u64,
    pub terminal: u64,
    pub retryable: u64,
    pub receive_errors: u64,
}

impl ConsumerStats {
    pub fn snapshot(&self) -> ConsumerStatsSnapshot {
        ConsumerStatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            acked: self.acked.load(Ordering::Relaxed),
            terminal: self.terminal.load(Ordering::Relaxed),
            retryable: self.retryable.load(Ordering::Relaxed),
            receive_errors: self.receive_errors.load(Ordering::Relaxed),
        }
    }
}
