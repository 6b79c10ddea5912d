//! # Adapters Module
//!
//! Guardian-set sources and the background refresh that feeds the history.

pub mod refresh;
pub mod static_source;
