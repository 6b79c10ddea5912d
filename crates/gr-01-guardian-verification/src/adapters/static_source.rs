//! Guardian sets known up front (config file, test fixture).

use crate::domain::entities::GuardianSet;
use crate::domain::errors::GuardianSetError;
use crate::ports::outbound::GuardianSetSource;
use parking_lot::RwLock;

/// In-memory source; `publish` simulates an on-chain rotation.
#[derive(Debug, Default)]
pub struct StaticGuardianSetSource {
    sets: RwLock<Vec<GuardianSet>>,
}

impl StaticGuardianSetSource {
    pub fn new(sets: Vec<GuardianSet>) -> Self {
        Self {
            sets: RwLock::new(sets),
        }
    }

    pub fn publish(&self, set: GuardianSet) {
        self.sets.write().push(set);
    }
}

#[async_trait::async_trait]
impl GuardianSetSource for StaticGuardianSetSource {
    async fn fetch_from(&self, next_index: u32) -> Result<Vec<GuardianSet>, GuardianSetError> {
        let mut found: Vec<GuardianSet> = self
            .sets
            .read()
            .iter()
            .filter(|s| s.index >= next_index)
            .cloned()
            .collect();
        found.sort_by_key(|s| s.index);
        Ok(found)
    }
}
