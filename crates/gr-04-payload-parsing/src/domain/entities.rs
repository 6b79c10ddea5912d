//! # Parsed VAA Records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{MessageId, Vaa};

/// Successful answer from the parser service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    /// Application the payload belongs to (token bridge, NFT bridge, ...).
    pub app_id: String,
    /// Decoded payload, shape defined by the application.
    pub result: serde_json::Value,
}

/// Stored outcome of decoding one message's payload.
///
/// Keyed by `id`; a re-parse of the same message overwrites the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedVaaRecord {
    pub id: MessageId,
    pub emitter_chain: u16,
    /// Emitter address, 64 lower-case hex digits.
    pub emitter_addr: String,
    /// Sequence as a decimal string.
    pub sequence: String,
    pub app_id: String,
    pub result: serde_json::Value,
    /// When the guardians observed the message.
    pub timestamp: DateTime<Utc>,
    /// Last write of this record.
    pub updated_at: DateTime<Utc>,
}

impl ParsedVaaRecord {
    pub fn new(vaa: &Vaa, parsed: ParseResponse, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: vaa.message_id(),
            emitter_chain: vaa.emitter_chain.0,
            emitter_addr: vaa.emitter_address.to_hex(),
            sequence: vaa.sequence.to_string(),
            app_id: parsed.app_id,
            result: parsed.result,
            timestamp: DateTime::from_timestamp(i64::from(vaa.timestamp), 0).unwrap_or_default(),
            updated_at,
        }
    }
}
