//! A single key's slot in the dedup table.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::Instant;

/// Slot for one MessageID.
///
/// The cell is empty while no attempt has succeeded and holds the completion
/// instant afterwards. Every in-flight `apply` holds a clone of the `Arc`, so
/// a strong count of one means nobody is using the slot.
pub(crate) struct DedupEntry {
    pub(crate) cell: Arc<OnceCell<Instant>>,
    pub(crate) created_at: Instant,
}

impl DedupEntry {
    pub(crate) fn new(now: Instant) -> Self {
        Self {
            cell: Arc::new(OnceCell::new()),
            created_at: now,
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        self.cell.initialized()
    }

    /// No `apply` currently holds the slot.
    pub(crate) fn is_idle(&self) -> bool {
        Arc::strong_count(&self.cell) == 1
    }

    /// Completion instant, or creation for a key that never succeeded.
    pub(crate) fn last_touched(&self) -> Instant {
        self.cell.get().copied().unwrap_or(self.created_at)
    }

    /// Whether a sweep at `now` may drop this entry.
    pub(crate) fn is_evictable(&self, now: Instant, ttl: Duration) -> bool {
        match self.cell.get() {
            Some(done_at) => now.saturating_duration_since(*done_at) > ttl,
            None => {
                now.saturating_duration_since(self.created_at) > ttl && self.is_idle()
            }
        }
    }
}
