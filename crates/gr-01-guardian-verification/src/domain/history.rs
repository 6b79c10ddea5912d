//! # Guardian Set History
//!
//! Append-only, gap-free list of guardian sets indexed by version.
//!
//! Readers take a lock-free snapshot; a rotation publishes a new list with
//! one more set. Verifications that already loaded the old list finish
//! against it.

use super::entities::GuardianSet;
use super::errors::GuardianSetError;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::Arc;

pub struct GuardianSetHistory {
    sets: ArcSwap<Vec<Arc<GuardianSet>>>,
    /// Serializes appends; readers never take it.
    append_lock: Mutex<()>,
}

impl GuardianSetHistory {
    pub fn new() -> Self {
        Self {
            sets: ArcSwap::from_pointee(Vec::new()),
            append_lock: Mutex::new(()),
        }
    }

    /// Build a history from sets given in index order starting at 0.
    pub fn from_sets(sets: impl IntoIterator<Item = GuardianSet>) -> Result<Self, GuardianSetError> {
        let history = Self::new();
        for set in sets {
            history.append(set)?;
        }
        Ok(history)
    }

    /// Append the next guardian set.
    ///
    /// The set's index must equal the current length; an index that is
    /// already present or skips ahead is rejected.
    pub fn append(&self, set: GuardianSet) -> Result<(), GuardianSetError> {
        if set.is_empty() {
            return Err(GuardianSetError::EmptyKeySet { index: set.index });
        }

        let _guard = self.append_lock.lock();
        let current = self.sets.load_full();
        let expected = current.len() as u32;
        if set.index != expected {
            return Err(GuardianSetError::NonSequentialIndex {
                expected,
                got: set.index,
            });
        }

        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(Arc::new(set));
        self.sets.store(Arc::new(next));

        tracing::info!(index = expected, "guardian set appended");
        Ok(())
    }

    pub fn get(&self, index: u32) -> Option<Arc<GuardianSet>> {
        self.sets.load().get(index as usize).cloned()
    }

    /// Set `index` if it exists and has not expired at `unix_secs`.
    ///
    /// The latest set never expires regardless of its expiration time.
    pub fn get_valid_at(&self, index: u32, unix_secs: u64) -> Option<Arc<GuardianSet>> {
        let sets = self.sets.load();
        let set = sets.get(index as usize)?;
        let is_latest = index as usize + 1 == sets.len();
        if is_latest || set.is_active_at(unix_secs) {
            Some(Arc::clone(set))
        } else {
            None
        }
    }

    pub fn latest(&self) -> Option<Arc<GuardianSet>> {
        self.sets.load().last().cloned()
    }

    /// Index the next appended set must carry.
    pub fn next_index(&self) -> u32 {
        self.sets.load().len() as u32
    }

    pub fn len(&self) -> usize {
        self.sets.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.load().is_empty()
    }

    /// Point-in-time view of every known set.
    pub fn snapshot(&self) -> Arc<Vec<Arc<GuardianSet>>> {
        self.sets.load_full()
    }
}

impl Default for GuardianSetHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GuardianSetHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardianSetHistory")
            .field("len", &self.len())
            .finish()
    }
}
