//! Deduplicator counters.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct DedupStats {
    /// Calls to `apply`
    pub applied: AtomicU64,
    /// Actions that ran to success
    pub executed: AtomicU64,
    /// Calls answered from a done entry without running anything
    pub skipped: AtomicU64,
    /// Actions that returned an error
    pub failed: AtomicU64,
    /// Entries removed by sweeps
    pub evicted: AtomicU64,
}

/// Point-in-time copy of `DedupStats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStatsSnapshot {
    pub applied: u64,
    pub executed: u64,
    pub skipped: u64,
    pub failed: u64,
    pub evicted: u64,
}

impl DedupStats {
    pub fn snapshot(&self) -> DedupStatsSnapshot {
        DedupStatsSnapshot {
            applied: self.applied.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
        }
    }
}
