//! Deterministic guardian keys and VAA signing for tests.
//!
//! Enabled for this crate's own tests and, through the `test-helpers` feature,
//! for downstream crates that need validly signed VAAs.

#![allow(clippy::expect_used)]

use crate::domain::ecdsa::{address_from_pubkey, invert_s, is_low_s};
use crate::domain::entities::{EcdsaSignature, GuardianSet};
use k256::ecdsa::SigningKey;
use shared_types::{
    keccak256, ChainId, EmitterAddress, GuardianSignature, Hash, Vaa, SIGNATURE_LENGTH,
};

pub use k256::ecdsa::SigningKey as GuardianKey;

/// Deterministic signing key for test guardian `seed`.
pub fn guardian_key(seed: u32) -> SigningKey {
    let mut material = b"guardian-relay/test-guardian/".to_vec();
    material.extend_from_slice(&seed.to_be_bytes());
    SigningKey::from_slice(&keccak256(&material)).expect("keccak output is a valid scalar")
}

/// `n` deterministic guardian keys.
pub fn guardian_keys(n: usize) -> Vec<SigningKey> {
    (0..n as u32).map(guardian_key).collect()
}

/// Guardian set built from `keys` in order.
pub fn guardian_set(index: u32, keys: &[SigningKey]) -> GuardianSet {
    GuardianSet::new(
        index,
        keys.iter()
            .map(|k| address_from_pubkey(k.verifying_key()))
            .collect(),
    )
}

/// Sign a digest, normalizing S to the lower half of the curve order.
pub fn sign_digest(digest: &Hash, key: &SigningKey) -> EcdsaSignature {
    let (sig, recid) = key
        .sign_prehash_recoverable(digest)
        .expect("signing failed");

    let sig_bytes = sig.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&sig_bytes[..32]);
    s.copy_from_slice(&sig_bytes[32..]);

    if is_low_s(&s) {
        EcdsaSignature {
            r,
            s,
            v: recid.to_byte(),
        }
    } else {
        // Inverting S flips the recovery parity.
        EcdsaSignature {
            r,
            s: invert_s(&s),
            v: recid.to_byte() ^ 1,
        }
    }
}

/// Wire form of a signature for guardian `index`.
pub fn to_guardian_signature(index: u8, sig: &EcdsaSignature) -> GuardianSignature {
    let mut raw = [0u8; SIGNATURE_LENGTH];
    raw[..32].copy_from_slice(&sig.r);
    raw[32..64].copy_from_slice(&sig.s);
    raw[64] = sig.v;
    GuardianSignature::new(index, raw)
}

/// Unsigned VAA with fixed header/body values.
pub fn unsigned_vaa(
    guardian_set_index: u32,
    chain: ChainId,
    sequence: u64,
    payload: &[u8],
) -> Vaa {
    Vaa {
        version: Vaa::SUPPORTED_VERSION,
        guardian_set_index,
        signatures: Vec::new(),
        timestamp: 1_700_000_000,
        nonce: 0,
        emitter_chain: chain,
        emitter_address: EmitterAddress([0x0E; 32]),
        sequence,
        consistency_level: 1,
        payload: payload.to_vec(),
    }
}

/// Replace the VAA's signatures with signatures from `keys[i]` for each `i`
/// in `signers`, in the given order.
pub fn sign_vaa(vaa: &mut Vaa, keys: &[SigningKey], signers: &[u8]) {
    let digest = vaa.signing_digest();
    vaa.signatures = signers
        .iter()
        .map(|&i| to_guardian_signature(i, &sign_digest(&digest, &keys[i as usize])))
        .collect();
}

/// VAA signed by guardians `0..signers` of `keys`.
pub fn signed_vaa(
    guardian_set_index: u32,
    keys: &[SigningKey],
    signers: usize,
    chain: ChainId,
    sequence: u64,
    payload: &[u8],
) -> Vaa {
    let mut vaa = unsigned_vaa(guardian_set_index, chain, sequence, payload);
    let indices: Vec<u8> = (0..signers as u8).collect();
    sign_vaa(&mut vaa, keys, &indices);
    vaa
}
