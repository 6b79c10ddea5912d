//! # Error Types
//!
//! Wire-decoding errors and the disposition vocabulary used to decide whether a
//! failed delivery is dropped (terminal) or left for redelivery (retryable).

use thiserror::Error;

/// Errors decoding a VAA from its wire bytes. Always terminal: malformed bytes
/// never decode on a later attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// No bytes at all.
    #[error("empty VAA")]
    Empty,

    /// Version byte is not supported.
    #[error("unsupported VAA version {0}")]
    UnsupportedVersion(u8),

    /// Buffer ended inside a fixed-size section.
    #[error("truncated VAA {field}: need {needed} bytes, {remaining} remaining")]
    Truncated {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },
}

/// Errors encoding a VAA whose fields do not fit the wire format.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The signature count is a single byte on the wire.
    #[error("{count} signatures exceed the wire limit of 255")]
    TooManySignatures { count: usize },
}

/// What the ingestion layer should do with a delivery that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Retrying cannot change the outcome: log and acknowledge.
    Terminal,
    /// A later attempt may succeed: leave unacknowledged for redelivery.
    Retryable,
}

impl Disposition {
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Disposition::Retryable)
    }
}

/// Errors that know their own disposition.
pub trait Classify {
    fn disposition(&self) -> Disposition;
}

impl Classify for DecodeError {
    fn disposition(&self) -> Disposition {
        Disposition::Terminal
    }
}
