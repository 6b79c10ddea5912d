//! # Deduplicator
//!
//! Per-key `OnceCell` in a sharded `DashMap`. The cell's own semaphore
//! serializes attempts for one key; different keys never contend beyond
//! their shard lock.
//!
//! ## Capacity
//!
//! The table never holds more than `max_entries` keys. A caller that needs a
//! new slot in a full table first runs a TTL sweep (at most once per
//! [`INLINE_SWEEP_GAP`]), then drops the oldest idle entries in a batch. Only
//! when every entry is held by an in-flight `apply` does it wait for one to
//! be released.

use crate::domain::config::DedupConfig;
use crate::domain::entry::DedupEntry;
use crate::domain::stats::DedupStats;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, OnceCell};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Minimum spacing between TTL sweeps triggered by a full table.
pub const INLINE_SWEEP_GAP: Duration = Duration::from_secs(1);

pub struct Deduplicator {
    entries: DashMap<String, DedupEntry>,
    /// Reserved slots; kept equal to `entries.len()` outside of inserts.
    occupied: AtomicUsize,
    last_inline_sweep: Mutex<Option<Instant>>,
    released: Notify,
    config: DedupConfig,
    stats: DedupStats,
}

impl Deduplicator {
    pub fn new(mut config: DedupConfig) -> Self {
        config.max_entries = config.max_entries.max(1);
        Self {
            entries: DashMap::new(),
            occupied: AtomicUsize::new(0),
            last_inline_sweep: Mutex::new(None),
            released: Notify::new(),
            config,
            stats: DedupStats::default(),
        }
    }

    /// Run `action` unless `key` already succeeded within the retention
    /// window.
    ///
    /// Returns `Ok(())` when the action succeeds here or has already
    /// succeeded (possibly in a concurrent caller this call waited on). An
    /// error is returned only to the caller whose action produced it.
    /// Dropping the returned future mid-action releases the key to the next
    /// waiter.
    pub async fn apply<F, Fut, E>(&self, key: &str, action: F) -> Result<(), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        self.stats.applied.fetch_add(1, Ordering::Relaxed);

        let held = Held {
            cell: self.slot(key).await,
            _wake: Wake(&self.released),
        };
        if held.cell.initialized() {
            self.stats.skipped.fetch_add(1, Ordering::Relaxed);
            debug!(message_id = key, "Already processed, skipping");
            return Ok(());
        }

        let ran = AtomicBool::new(false);
        let outcome = held
            .cell
            .get_or_try_init(|| async {
                ran.store(true, Ordering::Relaxed);
                action().await.map(|()| Instant::now())
            })
            .await
            .map(|_| ());
        drop(held);

        match outcome {
            Ok(()) if ran.load(Ordering::Relaxed) => {
                self.stats.executed.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Ok(()) => {
                self.stats.skipped.fetch_add(1, Ordering::Relaxed);
                debug!(message_id = key, "Processed concurrently, skipping");
                Ok(())
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    /// Whether `key` has a successful execution on record.
    pub fn is_done(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|e| e.is_done())
    }

    /// Drop every evictable entry. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let ttl = self.config.ttl;
        let mut removed = 0;

        self.entries.retain(|_, entry| {
            if entry.is_evictable(now, ttl) {
                removed += 1;
                false
            } else {
                true
            }
        });

        self.forget(removed);
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> &DedupStats {
        &self.stats
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// The key's cell, inserting a fresh entry if absent. The returned clone
    /// pins the entry against eviction until dropped.
    async fn slot(&self, key: &str) -> Arc<OnceCell<Instant>> {
        loop {
            if let Some(entry) = self.entries.get(key) {
                return Arc::clone(&entry.cell);
            }

            // Registered before the capacity checks so a release in between
            // is not missed.
            let released = self.released.notified();
            tokio::pin!(released);
            released.as_mut().enable();

            if self.reserve() {
                return match self.entries.entry(key.to_owned()) {
                    Entry::Occupied(existing) => {
                        self.occupied.fetch_sub(1, Ordering::AcqRel);
                        Arc::clone(&existing.get().cell)
                    }
                    Entry::Vacant(vacant) => {
                        Arc::clone(&vacant.insert(DedupEntry::new(Instant::now())).cell)
                    }
                };
            }

            if self.make_room() > 0 {
                continue;
            }

            debug!(
                max_entries = self.config.max_entries,
                "Dedup table full of in-flight keys, waiting for a release"
            );
            released.await;
        }
    }

    fn reserve(&self) -> bool {
        let max = self.config.max_entries;
        self.occupied
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max).then_some(n + 1)
            })
            .is_ok()
    }

    fn forget(&self, removed: usize) {
        if removed > 0 {
            self.occupied.fetch_sub(removed, Ordering::AcqRel);
            self.stats
                .evicted
                .fetch_add(removed as u64, Ordering::Relaxed);
        }
    }

    /// Free at least one slot if any entry is idle.
    fn make_room(&self) -> usize {
        if self.inline_sweep_due() {
            let removed = self.sweep();
            debug!(removed, "Dedup table at capacity, swept inline");
            if removed > 0 {
                return removed;
            }
        }
        self.drop_oldest_idle()
    }

    fn inline_sweep_due(&self) -> bool {
        let now = Instant::now();
        let mut last = self.last_inline_sweep.lock();
        match *last {
            Some(at) if now.saturating_duration_since(at) < INLINE_SWEEP_GAP => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// Drop a batch of the least recently completed idle entries, ahead of
    /// their TTL.
    fn drop_oldest_idle(&self) -> usize {
        let batch = (self.config.max_entries / 16).max(1);
        let mut idle: Vec<(Instant, String)> = self
            .entries
            .iter()
            .filter(|entry| entry.is_idle())
            .map(|entry| (entry.last_touched(), entry.key().clone()))
            .collect();
        idle.sort_unstable();
        idle.truncate(batch);

        let removed = idle
            .into_iter()
            .filter(|(_, key)| self.entries.remove_if(key, |_, e| e.is_idle()).is_some())
            .count();
        self.forget(removed);
        if removed > 0 {
            warn!(
                removed,
                max_entries = self.config.max_entries,
                "Dedup table full, dropped oldest keys before their TTL"
            );
        }
        removed
    }
}

/// A slot pinned by one `apply`. Fields drop in order, so capacity waiters
/// are woken only after the pin is gone, also when the `apply` future is
/// dropped mid-action.
struct Held<'a> {
    cell: Arc<OnceCell<Instant>>,
    _wake: Wake<'a>,
}

struct Wake<'a>(&'a Notify);

impl Drop for Wake<'_> {
    fn drop(&mut self) {
        self.0.notify_waiters();
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DedupConfig::default())
    }
}
