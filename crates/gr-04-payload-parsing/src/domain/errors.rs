//! # Payload Parsing Errors

use shared_types::{Classify, DecodeError, Disposition, Interrupted};
use thiserror::Error;

/// Parser service failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParserError {
    /// The service answered but failed internally.
    #[error("parser internal error: {0}")]
    InternalError(String),

    /// The service could not be reached or timed out.
    #[error("parser endpoint call failed: {0}")]
    EndpointCallError(String),

    /// The service does not understand this payload.
    #[error("payload unparseable: {0}")]
    Unparseable(String),
}

impl Classify for ParserError {
    fn disposition(&self) -> Disposition {
        match self {
            ParserError::InternalError(_) | ParserError::EndpointCallError(_) => {
                Disposition::Retryable
            }
            ParserError::Unparseable(_) => Disposition::Terminal,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("record serialization failed: {0}")]
    Serialization(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProcessError {
    #[error("malformed VAA: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Parser(ParserError),

    #[error("repository write failed: {0}")]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

impl Classify for ProcessError {
    fn disposition(&self) -> Disposition {
        match self {
            ProcessError::Decode(_) => Disposition::Terminal,
            ProcessError::Parser(e) => e.disposition(),
            ProcessError::Repository(_) | ProcessError::Interrupted(_) => Disposition::Retryable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_error_dispositions() {
        assert!(!ProcessError::Decode(DecodeError::Empty).disposition().is_retryable());
        assert!(ProcessError::Parser(ParserError::EndpointCallError("refused".into()))
            .disposition()
            .is_retryable());
        assert!(ProcessError::Parser(ParserError::InternalError("500".into()))
            .disposition()
            .is_retryable());
        assert!(ProcessError::Repository(RepositoryError::Storage("io".into()))
            .disposition()
            .is_retryable());
        assert!(ProcessError::Interrupted(Interrupted::DeadlineExceeded)
            .disposition()
            .is_retryable());
    }
}
