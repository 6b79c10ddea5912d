//! # Outbound Ports (Driven Ports / SPI)
//!
//! Where new guardian sets come from.

use crate::domain::entities::GuardianSet;
use crate::domain::errors::GuardianSetError;

/// Source of guardian-set rotations (a chain RPC, a config file, ...).
#[async_trait::async_trait]
pub trait GuardianSetSource: Send + Sync {
    /// Every set with index `>= next_index`, in ascending index order.
    ///
    /// Returns an empty list when nothing new is known.
    async fn fetch_from(&self, next_index: u32) -> Result<Vec<GuardianSet>, GuardianSetError>;
}
