//! # Queue Ingestion Errors

use gr_01_guardian_verification::VerificationError;
use gr_03_message_routing::RouterError;
use gr_04_payload_parsing::ProcessError;
use shared_types::{Classify, DecodeError, Disposition, MessageId};
use thiserror::Error;

/// Queue backend failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue backend error: {0}")]
    Backend(String),

    /// Receipt already consumed or its visibility window lapsed.
    #[error("unknown or expired receipt {0}")]
    UnknownReceipt(String),
}

/// Why an envelope could not be handled. Carries the MessageID once the body
/// has decoded far enough to know it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandlerError {
    #[error("malformed envelope body: {0}")]
    Decode(#[from] DecodeError),

    #[error("message {id}: {source}")]
    Verification {
        id: MessageId,
        #[source]
        source: VerificationError,
    },

    #[error("message {id}: {source}")]
    Routing {
        id: MessageId,
        #[source]
        source: RouterError,
    },

    #[error("message {id}: {source}")]
    Processing {
        id: MessageId,
        #[source]
        source: ProcessError,
    },
}

impl HandlerError {
    pub fn message_id(&self) -> Option<&MessageId> {
        match self {
            HandlerError::Decode(_) => None,
            HandlerError::Verification { id, .. }
            | HandlerError::Routing { id, .. }
            | HandlerError::Processing { id, .. } => Some(id),
        }
    }
}

impl Classify for HandlerError {
    fn disposition(&self) -> Disposition {
        match self {
            HandlerError::Decode(e) => e.disposition(),
            HandlerError::Verification { source, .. } => source.disposition(),
            HandlerError::Routing { source, .. } => source.disposition(),
            HandlerError::Processing { source, .. } => source.disposition(),
        }
    }
}
