//! Cross-subsystem flows.

pub mod flows;
pub mod ingestion;
