//! # Signer Recovery (secp256k1)
//!
//! Recovers the Ethereum-style address that produced a guardian signature.
//!
//! Guardian signatures are `r || s || v` with `v` in `{0, 1, 27, 28}`. Both
//! scalars are range-checked against the group order in constant time, and
//! high-S signatures are rejected so a signer cannot be counted twice through
//! a malleated copy.

use super::entities::EcdsaSignature;
use super::errors::SignatureError;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use shared_types::{keccak256, GuardianAddress, Hash};
use subtle::{Choice, ConstantTimeEq};

/// Group order of secp256k1, big-endian.
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// `floor(n / 2)`, the largest accepted S.
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Recover the signer's address from a signature over `digest`.
///
/// Checks performed before recovery:
/// 1. R and S are in [1, n-1]
/// 2. S is in the lower half of the curve order
/// 3. Recovery ID is 0, 1, 27 or 28
pub fn recover_address(
    digest: &Hash,
    signature: &EcdsaSignature,
) -> Result<GuardianAddress, SignatureError> {
    if !is_valid_scalar(&signature.r) || !is_valid_scalar(&signature.s) {
        return Err(SignatureError::InvalidFormat);
    }

    if !is_low_s(&signature.s) {
        return Err(SignatureError::MalleableSignature);
    }

    let recovery_id = parse_recovery_id(signature.v)?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);
    let sig = Signature::from_slice(&sig_bytes).map_err(|_| SignatureError::InvalidFormat)?;

    let recovered_key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    Ok(address_from_pubkey(&recovered_key))
}

/// Derive the Ethereum-style address of a public key.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> GuardianAddress {
    let point = public_key.to_encoded_point(false);
    let uncompressed = point.as_bytes();

    // Uncompressed point minus its 0x04 tag; the address is the hash tail.
    let hash = keccak256(&uncompressed[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Constant-time big-endian `a < b`.
fn ct_less(a: &[u8; 32], b: &[u8; 32]) -> Choice {
    let mut lt = Choice::from(0u8);
    let mut gt = Choice::from(0u8);
    for (x, y) in a.iter().zip(b.iter()) {
        let open = !(lt | gt);
        lt |= open & Choice::from((x < y) as u8);
        gt |= open & Choice::from((x > y) as u8);
    }
    lt
}

/// S at most `floor(n / 2)`, the EIP-2 bound.
pub(crate) fn is_low_s(s: &[u8; 32]) -> bool {
    (!ct_less(&SECP256K1_HALF_ORDER, s)).into()
}

/// Scalar in `[1, n-1]`.
fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let zero = scalar
        .iter()
        .fold(Choice::from(1u8), |acc, byte| acc & byte.ct_eq(&0u8));
    (!zero & ct_less(scalar, &SECP256K1_ORDER)).into()
}

/// Map `v` to a recovery id, accepting both raw and Ethereum-offset forms.
fn parse_recovery_id(v: u8) -> Result<RecoveryId, SignatureError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };

    RecoveryId::try_from(id).map_err(|_| SignatureError::InvalidRecoveryId(v))
}

/// `n - s`, the malleated twin of S.
#[cfg(any(test, feature = "test-helpers"))]
pub(crate) fn invert_s(s: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut borrow = false;
    for (i, (n, s)) in SECP256K1_ORDER.iter().zip(s.iter()).enumerate().rev() {
        let (d1, b1) = n.overflowing_sub(*s);
        let (d2, b2) = d1.overflowing_sub(borrow as u8);
        out[i] = d2;
        borrow = b1 | b2;
    }
    out
}
