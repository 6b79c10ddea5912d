//! # Payload Parsing Subsystem (GR-04)
//!
//! Turns a verified VAA into a `ParsedVaaRecord`: the payload is decoded by
//! the external parser service and the result is upserted by MessageID.
//!
//! ## Outcomes
//!
//! | Parser / repository result       | `process` returns            |
//! |----------------------------------|------------------------------|
//! | parsed, stored                   | `Ok(Some(record))`           |
//! | payload not understood           | `Ok(None)`, nothing stored   |
//! | parser down / internal error     | `Err(Parser)`, retryable     |
//! | repository failure               | `Err(Repository)`, retryable |
//! | malformed VAA bytes              | `Err(Decode)`, terminal      |

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::http_parser::HttpPayloadParser;
pub use adapters::memory::InMemoryRepository;
#[cfg(feature = "rocksdb")]
pub use adapters::rocksdb_adapter::RocksDbRepository;
pub use domain::entities::{ParseResponse, ParsedVaaRecord};
pub use domain::errors::{ParserError, ProcessError, RepositoryError};
pub use ports::outbound::{ParsedVaaRepository, PayloadParser};
pub use service::PayloadProcessor;
