//! # Routing Errors

use gr_01_guardian_verification::VerificationError;
use shared_types::{Classify, Disposition, Interrupted, MessageId};
use thiserror::Error;

/// Failure reported by a downstream handler.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PushError {
    /// Handler or its transport is temporarily unable to accept the message.
    #[error("downstream unavailable: {0}")]
    Unavailable(String),

    /// The push was cut short by cancellation or its deadline.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),

    /// Handler refuses this message permanently.
    #[error("downstream rejected message: {0}")]
    Rejected(String),
}

impl Classify for PushError {
    fn disposition(&self) -> Disposition {
        match self {
            PushError::Unavailable(_) | PushError::Interrupted(_) => Disposition::Retryable,
            PushError::Rejected(_) => Disposition::Terminal,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("verification failed: {0}")]
    Verification(#[from] VerificationError),

    #[error("no route for message {0}")]
    NoRoute(MessageId),

    #[error(transparent)]
    Downstream(#[from] PushError),
}

impl Classify for RouterError {
    fn disposition(&self) -> Disposition {
        match self {
            RouterError::Verification(_) | RouterError::NoRoute(_) => Disposition::Terminal,
            RouterError::Downstream(e) => e.disposition(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downstream_disposition_passes_through() {
        let retry = RouterError::Downstream(PushError::Unavailable("queue".into()));
        let drop = RouterError::Downstream(PushError::Rejected("bad".into()));
        assert!(retry.disposition().is_retryable());
        assert!(!drop.disposition().is_retryable());
    }

    #[test]
    fn test_verification_is_terminal() {
        let err = RouterError::from(VerificationError::QuorumNotMet { have: 1, need: 13 });
        assert_eq!(err.disposition(), Disposition::Terminal);
        assert_eq!(
            RouterError::from(PushError::from(Interrupted::Cancelled)).disposition(),
            Disposition::Retryable
        );
    }
}
