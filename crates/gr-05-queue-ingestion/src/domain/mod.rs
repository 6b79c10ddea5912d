//! # Domain Layer

pub mod config;
pub mod envelope;
pub mod errors;
pub mod stats;
