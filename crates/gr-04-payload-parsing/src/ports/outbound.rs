//! # Outbound Ports (Driven Ports / SPI)

use crate::domain::entities::{ParseResponse, ParsedVaaRecord};
use crate::domain::errors::{ParserError, RepositoryError};
use shared_types::{ChainId, EmitterAddress, MessageId};

/// The external payload decode service.
#[async_trait::async_trait]
pub trait PayloadParser: Send + Sync {
    /// Decode `payload` emitted by `emitter_address` on `chain`.
    ///
    /// # Errors
    /// * `InternalError` - the service failed; worth retrying
    /// * `EndpointCallError` - the service was unreachable; worth retrying
    /// * `Unparseable` - no decoder for this payload
    async fn parse(
        &self,
        chain: ChainId,
        emitter_address: &EmitterAddress,
        sequence: u64,
        payload: &[u8],
    ) -> Result<ParseResponse, ParserError>;
}

/// Store of parsed VAAs, keyed by MessageID.
#[async_trait::async_trait]
pub trait ParsedVaaRepository: Send + Sync {
    /// Insert or overwrite the record with `record.id`.
    async fn upsert_parsed_vaa(&self, record: &ParsedVaaRecord) -> Result<(), RepositoryError>;

    async fn get(&self, id: &MessageId) -> Result<Option<ParsedVaaRecord>, RepositoryError>;
}
