//! # Domain Layer
//!
//! Table entries, tunables and counters. No I/O.

pub mod config;
pub mod entry;
pub mod stats;
