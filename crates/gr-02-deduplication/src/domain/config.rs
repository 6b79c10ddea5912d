//! Deduplicator tunables.

use std::time::Duration;

/// Default retention for a completed key. Must exceed the queue's maximum
/// redelivery latency (visibility timeout plus backoff).
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Default period of the background sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Default bound on tracked keys.
pub const DEFAULT_MAX_ENTRIES: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupConfig {
    /// How long a key stays done after its action succeeded.
    pub ttl: Duration,
    /// Period of `sweep_task`.
    pub sweep_interval: Duration,
    /// Bound on tracked keys. A full table sweeps expired entries, then
    /// drops the oldest idle ones; callers wait only while every entry is
    /// in flight.
    pub max_entries: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl DedupConfig {
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }
}
