//! # Adapters Module
//!
//! Background maintenance for the dedup table.

pub mod sweeper;
