//! # VAA Wire Format
//!
//! Binary layout (big-endian):
//!
//! ```text
//! header: version u8 | guardian_set_index u32 | n u8 | n * (index u8, sig [65])
//! body:   timestamp u32 | nonce u32 | emitter_chain u16 | emitter_address [32]
//!         | sequence u64 | consistency_level u8 | payload [..]
//! ```
//!
//! The body is what guardians sign (via [`Vaa::signing_digest`]). The payload
//! runs to the end of the buffer.

use crate::entities::{ChainId, EmitterAddress, GuardianSignature, Vaa, SIGNATURE_LENGTH};
use crate::errors::{DecodeError, EncodeError};
use bytes::{Buf, BufMut};

/// Size of the fixed part of the body (everything except the payload).
const BODY_FIXED_LEN: usize = 4 + 4 + 2 + 32 + 8 + 1;

/// Size of one encoded signature entry.
const SIGNATURE_ENTRY_LEN: usize = 1 + SIGNATURE_LENGTH;

impl Vaa {
    /// Decode a VAA from its wire bytes.
    ///
    /// # Errors
    /// - `DecodeError::Empty` - no bytes
    /// - `DecodeError::UnsupportedVersion` - version byte is not 1
    /// - `DecodeError::Truncated` - buffer ends inside a fixed-size field
    pub fn decode(bytes: &[u8]) -> Result<Vaa, DecodeError> {
        let mut buf = bytes;
        if !buf.has_remaining() {
            return Err(DecodeError::Empty);
        }

        let version = buf.get_u8();
        if version != Vaa::SUPPORTED_VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }

        need(buf, 4 + 1, "header")?;
        let guardian_set_index = buf.get_u32();
        let count = buf.get_u8() as usize;

        need(buf, count * SIGNATURE_ENTRY_LEN, "signatures")?;
        let mut signatures = Vec::with_capacity(count);
        for _ in 0..count {
            let index = buf.get_u8();
            let mut signature = [0u8; SIGNATURE_LENGTH];
            buf.copy_to_slice(&mut signature);
            signatures.push(GuardianSignature { index, signature });
        }

        need(buf, BODY_FIXED_LEN, "body")?;
        let timestamp = buf.get_u32();
        let nonce = buf.get_u32();
        let emitter_chain = ChainId(buf.get_u16());
        let mut emitter_address = [0u8; 32];
        buf.copy_to_slice(&mut emitter_address);
        let sequence = buf.get_u64();
        let consistency_level = buf.get_u8();
        let payload = buf.to_vec();

        Ok(Vaa {
            version,
            guardian_set_index,
            signatures,
            timestamp,
            nonce,
            emitter_chain,
            emitter_address: EmitterAddress(emitter_address),
            sequence,
            consistency_level,
            payload,
        })
    }

    /// Encode the full VAA (header + body).
    ///
    /// # Errors
    /// - `EncodeError::TooManySignatures` - more than 255 signatures
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let count = u8::try_from(self.signatures.len()).map_err(|_| {
            EncodeError::TooManySignatures {
                count: self.signatures.len(),
            }
        })?;
        let body = self.body_bytes();
        let mut out =
            Vec::with_capacity(6 + self.signatures.len() * SIGNATURE_ENTRY_LEN + body.len());
        out.put_u8(self.version);
        out.put_u32(self.guardian_set_index);
        out.put_u8(count);
        for sig in &self.signatures {
            out.put_u8(sig.index);
            out.put_slice(&sig.signature);
        }
        out.put_slice(&body);
        Ok(out)
    }

    /// Encode only the signed body.
    pub fn body_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BODY_FIXED_LEN + self.payload.len());
        out.put_u32(self.timestamp);
        out.put_u32(self.nonce);
        out.put_u16(self.emitter_chain.0);
        out.put_slice(self.emitter_address.as_bytes());
        out.put_u64(self.sequence);
        out.put_u8(self.consistency_level);
        out.put_slice(&self.payload);
        out
    }
}

fn need(buf: &[u8], len: usize, field: &'static str) -> Result<(), DecodeError> {
    if buf.len() < len {
        return Err(DecodeError::Truncated {
            field,
            needed: len,
            remaining: buf.len(),
        });
    }
    Ok(())
}
