//! # Verification Errors
//!
//! Error types for guardian signature verification and guardian-set history
//! maintenance.

use shared_types::{Classify, Disposition, GuardianAddress};
use thiserror::Error;

/// Why a single signature failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// R or S is zero or not below the curve order
    #[error("invalid signature format")]
    InvalidFormat,

    /// Signature has high S value (malleability protection)
    #[error("malleable signature (high S value)")]
    MalleableSignature,

    /// Invalid recovery ID (v must be 0, 1, 27, or 28)
    #[error("invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    /// Failed to recover public key from signature
    #[error("failed to recover public key")]
    RecoveryFailed,

    /// Guardian index points past the end of the guardian set
    #[error("guardian index {index} out of range for set of {set_size}")]
    GuardianIndexOutOfRange { index: u8, set_size: usize },

    /// Recovered signer does not match the guardian at that index
    #[error("signer mismatch: expected {expected:02x?}, got {actual:02x?}")]
    SignerMismatch {
        expected: GuardianAddress,
        actual: GuardianAddress,
    },
}

/// Verification failures. All are terminal: no retry changes a signature.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    /// No guardian set with the message's index is known.
    #[error("unknown guardian set {index}")]
    UnknownGuardianSet { index: u32 },

    /// A signature does not belong to the guardian at its index.
    #[error("bad signature from guardian {guardian_index}: {reason}")]
    BadSignature {
        guardian_index: u8,
        reason: SignatureError,
    },

    /// Guardian index repeated (or out of order, which is how a repeat hides).
    #[error("duplicate or out-of-order signer index {guardian_index}")]
    DuplicateSigner { guardian_index: u8 },

    /// Fewer valid unique signatures than the quorum.
    #[error("quorum not met: {have} signatures, need {need}")]
    QuorumNotMet { have: usize, need: usize },
}

impl Classify for VerificationError {
    fn disposition(&self) -> Disposition {
        Disposition::Terminal
    }
}

/// Guardian-set history maintenance errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GuardianSetError {
    /// History is append-only and gap-free.
    #[error("guardian set index {got} is not next (expected {expected})")]
    NonSequentialIndex { expected: u32, got: u32 },

    /// A set with no keys can never reach quorum.
    #[error("guardian set {index} has no keys")]
    EmptyKeySet { index: u32 },

    /// The refresh source failed.
    #[error("guardian set source failed: {0}")]
    Source(String),
}
