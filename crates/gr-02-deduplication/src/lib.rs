//! # Deduplication Subsystem (GR-02)
//!
//! Guarantees at most one successful execution of an action per MessageID
//! within a retention window, while never memoizing a failure.
//!
//! ## Semantics
//!
//! - Concurrent `apply` calls for one key are serialized: the first runs the
//!   action, the others wait for it.
//! - Success marks the key done; every waiter and later caller returns
//!   `Ok(())` without running anything.
//! - Failure leaves the key unset; the next waiter (or a redelivery) runs its
//!   own attempt. Two executions for one key never overlap.
//! - Done entries are evicted `ttl` after completion. Entries with a caller
//!   in flight are never evicted.
//! - The table holds at most `max_entries` keys. When full, the oldest idle
//!   entries are dropped early; if every entry is in flight, new keys wait.
//!
//! A redelivery that arrives after its done entry was evicted runs the action
//! again, so `ttl` must exceed the queue's maximum redelivery latency.

pub mod adapters;
pub mod domain;
pub mod service;

pub use adapters::sweeper::sweep_task;
pub use domain::config::DedupConfig;
pub use domain::stats::{DedupStats, DedupStatsSnapshot};
pub use service::Deduplicator;
