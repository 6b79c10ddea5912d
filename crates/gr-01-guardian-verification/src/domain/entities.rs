//! # Domain Entities
//!
//! Guardian sets and the recoverable signature form used for signer recovery.

use shared_types::{GuardianAddress, GuardianSignature};

// =============================================================================
// ECDSA Types (secp256k1)
// =============================================================================

/// Recoverable ECDSA signature on the secp256k1 curve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcdsaSignature {
    /// R component (32 bytes)
    pub r: [u8; 32],
    /// S component (32 bytes)
    pub s: [u8; 32],
    /// Recovery ID (0, 1, 27, or 28)
    pub v: u8,
}

impl From<&GuardianSignature> for EcdsaSignature {
    fn from(sig: &GuardianSignature) -> Self {
        Self {
            r: sig.r(),
            s: sig.s(),
            v: sig.v(),
        }
    }
}

// =============================================================================
// Guardian Sets
// =============================================================================

/// Minimum number of valid, uniquely-indexed signatures for a set of `n`
/// guardians: strictly more than two thirds.
pub fn quorum(n: usize) -> usize {
    (n * 2) / 3 + 1
}

/// An ordered, versioned list of guardian addresses.
///
/// Immutable once appended to the history; a rotation produces a new set with
/// the next index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardianSet {
    /// Version of this set.
    pub index: u32,
    /// Guardian addresses; a signature's guardian index points into this list.
    pub keys: Vec<GuardianAddress>,
    /// Unix seconds after which this set no longer attests new messages.
    pub expiration_time: Option<u64>,
}

impl GuardianSet {
    pub fn new(index: u32, keys: Vec<GuardianAddress>) -> Self {
        Self {
            index,
            keys,
            expiration_time: None,
        }
    }

    #[must_use]
    pub fn with_expiration(mut self, unix_secs: u64) -> Self {
        self.expiration_time = Some(unix_secs);
        self
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key(&self, guardian_index: u8) -> Option<&GuardianAddress> {
        self.keys.get(guardian_index as usize)
    }

    pub fn quorum(&self) -> usize {
        quorum(self.keys.len())
    }

    /// Whether the set is still within its validity window at `unix_secs`.
    pub fn is_active_at(&self, unix_secs: u64) -> bool {
        self.expiration_time.map_or(true, |exp| unix_secs < exp)
    }
}
