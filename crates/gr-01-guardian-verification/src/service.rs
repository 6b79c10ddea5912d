//! # Guardian Set Verifier
//!
//! Application service implementing `VaaVerifier` against a shared
//! `GuardianSetHistory`.
//!
//! Structural checks (set lookup, index ordering, quorum count) run before
//! any signer recovery, so a short or malformed signature list costs no
//! curve operations. Recovery then runs across the rayon pool.

use crate::domain::ecdsa;
use crate::domain::entities::EcdsaSignature;
use crate::domain::errors::{SignatureError, VerificationError};
use crate::domain::history::GuardianSetHistory;
use crate::ports::inbound::VaaVerifier;
use rayon::prelude::*;
use shared_types::Vaa;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::debug;

pub struct GuardianSetVerifier {
    history: Arc<GuardianSetHistory>,
}

impl GuardianSetVerifier {
    pub fn new(history: Arc<GuardianSetHistory>) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &Arc<GuardianSetHistory> {
        &self.history
    }
}

impl VaaVerifier for GuardianSetVerifier {
    fn verify(&self, vaa: &Vaa) -> Result<(), VerificationError> {
        let set = self.history.get(vaa.guardian_set_index).ok_or(
            VerificationError::UnknownGuardianSet {
                index: vaa.guardian_set_index,
            },
        )?;

        let mut previous: Option<u8> = None;
        for sig in &vaa.signatures {
            if previous.is_some_and(|p| sig.index <= p) {
                return Err(VerificationError::DuplicateSigner {
                    guardian_index: sig.index,
                });
            }
            previous = Some(sig.index);

            if set.key(sig.index).is_none() {
                return Err(VerificationError::BadSignature {
                    guardian_index: sig.index,
                    reason: SignatureError::GuardianIndexOutOfRange {
                        index: sig.index,
                        set_size: set.len(),
                    },
                });
            }
        }

        let need = set.quorum();
        if vaa.signatures.len() < need {
            return Err(VerificationError::QuorumNotMet {
                have: vaa.signatures.len(),
                need,
            });
        }

        let digest = vaa.signing_digest();
        let failure = vaa.signatures.par_iter().find_map_first(|sig| {
            let Some(expected) = set.key(sig.index) else {
                return Some((sig.index, SignatureError::RecoveryFailed));
            };
            match ecdsa::recover_address(&digest, &EcdsaSignature::from(sig)) {
                Ok(actual) if bool::from(actual.as_slice().ct_eq(expected.as_slice())) => None,
                Ok(actual) => Some((
                    sig.index,
                    SignatureError::SignerMismatch {
                        expected: *expected,
                        actual,
                    },
                )),
                Err(reason) => Some((sig.index, reason)),
            }
        });

        if let Some((guardian_index, reason)) = failure {
            debug!(
                message_id = %vaa.message_id(),
                guardian_index,
                reason = %reason,
                "VAA signature rejected"
            );
            return Err(VerificationError::BadSignature {
                guardian_index,
                reason,
            });
        }

        Ok(())
    }
}
