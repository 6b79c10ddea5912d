//! # Guardian-Relay Test Suite
//!
//! Cross-subsystem tests.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── fixtures.rs       # Scripted parser, pipeline builder
//! │   └── integration/
//! │       ├── flows.rs      # Verify + dedup + route properties
//! │       └── ingestion.rs  # Gossip → queue → parser → repository
//! └── benches/
//!     └── ingestion_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gr-tests
//! cargo test -p gr-tests integration::ingestion
//! cargo bench -p gr-tests
//! ```

pub mod fixtures;
pub mod integration;
