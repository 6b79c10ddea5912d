//! # Domain Entities
//!
//! The attested message (VAA) and the identifiers derived from it.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// 32-byte hash (keccak256 output).
pub type Hash = [u8; 32];

/// Ethereum-style guardian address (last 20 bytes of keccak256(pubkey)).
pub type GuardianAddress = [u8; 20];

/// Length of a recoverable secp256k1 signature: r (32) || s (32) || v (1).
pub const SIGNATURE_LENGTH: usize = 65;

// =============================================================================
// CHAIN IDENTIFIERS
// =============================================================================

/// Origin chain identifier (16-bit on the wire).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u16);

impl ChainId {
    pub const UNSET: ChainId = ChainId(0);
    pub const SOLANA: ChainId = ChainId(1);
    pub const ETHEREUM: ChainId = ChainId(2);
    pub const TERRA: ChainId = ChainId(3);
    pub const BSC: ChainId = ChainId(4);
    pub const POLYGON: ChainId = ChainId(5);
    pub const AVALANCHE: ChainId = ChainId(6);
    pub const OASIS: ChainId = ChainId(7);
    pub const ALGORAND: ChainId = ChainId(8);
    pub const AURORA: ChainId = ChainId(9);
    pub const FANTOM: ChainId = ChainId(10);
    pub const KARURA: ChainId = ChainId(11);
    pub const ACALA: ChainId = ChainId(12);
    pub const KLAYTN: ChainId = ChainId(13);
    pub const CELO: ChainId = ChainId(14);
    pub const NEAR: ChainId = ChainId(15);
    pub const MOONBEAM: ChainId = ChainId(16);
    pub const TERRA2: ChainId = ChainId(18);
    pub const INJECTIVE: ChainId = ChainId(19);
    pub const SUI: ChainId = ChainId(21);
    pub const APTOS: ChainId = ChainId(22);
    pub const ARBITRUM: ChainId = ChainId(23);
    pub const OPTIMISM: ChainId = ChainId(24);
    /// Price-oracle chain; its messages take a dedicated routing category.
    pub const PYTHNET: ChainId = ChainId(26);
    pub const XPLA: ChainId = ChainId(28);
    pub const BASE: ChainId = ChainId(30);
    pub const WORMCHAIN: ChainId = ChainId(3104);
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for ChainId {
    fn from(value: u16) -> Self {
        ChainId(value)
    }
}

// =============================================================================
// EMITTER ADDRESS
// =============================================================================

/// 32-byte origin (emitter) address, rendered as 64 lower-case hex digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmitterAddress(pub [u8; 32]);

impl EmitterAddress {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lower-case hex rendering without a `0x` prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for EmitterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for EmitterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmitterAddress({})", self.to_hex())
    }
}

impl FromStr for EmitterAddress {
    type Err = hex::FromHexError;

    /// Accepts 64 hex digits, optionally prefixed with `0x`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut out = [0u8; 32];
        hex::decode_to_slice(s, &mut out)?;
        Ok(EmitterAddress(out))
    }
}

impl From<[u8; 32]> for EmitterAddress {
    fn from(value: [u8; 32]) -> Self {
        EmitterAddress(value)
    }
}

// =============================================================================
// MESSAGE ID
// =============================================================================

/// Deterministic key for a logical message: `chain/emitter/sequence`.
///
/// Used both as the deduplication key and as the repository primary key, so
/// every redelivery of the same message maps onto the same id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(chain: ChainId, emitter: &EmitterAddress, sequence: u64) -> Self {
        MessageId(format!("{}/{}/{}", chain, emitter, sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MessageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// VAA
// =============================================================================

/// A single guardian's signature over the VAA signing digest.
#[derive(Clone, PartialEq, Eq)]
pub struct GuardianSignature {
    /// Position of the signer in the guardian set.
    pub index: u8,
    /// r (32) || s (32) || v (1).
    pub signature: [u8; SIGNATURE_LENGTH],
}

impl GuardianSignature {
    pub fn new(index: u8, signature: [u8; SIGNATURE_LENGTH]) -> Self {
        Self { index, signature }
    }

    pub fn r(&self) -> [u8; 32] {
        let mut r = [0u8; 32];
        r.copy_from_slice(&self.signature[..32]);
        r
    }

    pub fn s(&self) -> [u8; 32] {
        let mut s = [0u8; 32];
        s.copy_from_slice(&self.signature[32..64]);
        s
    }

    pub fn v(&self) -> u8 {
        self.signature[64]
    }
}

impl fmt::Debug for GuardianSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardianSignature")
            .field("index", &self.index)
            .field("signature", &hex::encode(self.signature))
            .finish()
    }
}

/// Verifiable Action Approval: a cross-chain message attested by guardians.
///
/// Constructed transiently per delivery; never persisted verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vaa {
    // Header
    pub version: u8,
    pub guardian_set_index: u32,
    pub signatures: Vec<GuardianSignature>,

    // Body
    pub timestamp: u32,
    pub nonce: u32,
    pub emitter_chain: ChainId,
    pub emitter_address: EmitterAddress,
    pub sequence: u64,
    pub consistency_level: u8,
    pub payload: Vec<u8>,
}

impl Vaa {
    /// The only supported wire version.
    pub const SUPPORTED_VERSION: u8 = 1;

    /// Key used for deduplication and storage.
    pub fn message_id(&self) -> MessageId {
        MessageId::new(self.emitter_chain, &self.emitter_address, self.sequence)
    }

    /// Digest the guardians sign: keccak256(keccak256(body)).
    pub fn signing_digest(&self) -> Hash {
        keccak256(&keccak256(&self.body_bytes()))
    }
}

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}
