//! # Inbound Ports (Driving Ports / API)
//!
//! The verification API used by the router and the queue handlers.

use crate::domain::errors::VerificationError;
use shared_types::Vaa;

/// Checks that a VAA carries a quorum of valid guardian signatures.
///
/// Synchronous and side-effect free; may be called from many tasks at once.
pub trait VaaVerifier: Send + Sync {
    /// Verify `vaa` against the guardian set it names.
    ///
    /// # Errors
    /// * `UnknownGuardianSet` - set index not in the history
    /// * `DuplicateSigner` - signer indices not strictly increasing
    /// * `QuorumNotMet` - too few signatures for the set size
    /// * `BadSignature` - any signature fails recovery or names the wrong guardian
    fn verify(&self, vaa: &Vaa) -> Result<(), VerificationError>;
}

impl<T: VaaVerifier + ?Sized> VaaVerifier for std::sync::Arc<T> {
    fn verify(&self, vaa: &Vaa) -> Result<(), VerificationError> {
        (**self).verify(vaa)
    }
}
