//! # Adapters Module

pub mod http_parser;
pub mod memory;
#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;
