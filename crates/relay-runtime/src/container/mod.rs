//! # Subsystem Container
//!
//! Configuration plus the fully wired subsystem graph.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, RelayConfig, StorageBackend};
pub use subsystems::RelayContainer;
