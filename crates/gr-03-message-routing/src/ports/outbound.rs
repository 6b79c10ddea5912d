//! # Outbound Ports (Driven Ports / SPI)

use crate::domain::errors::PushError;
use shared_types::{Context, Vaa};

/// Downstream consumer for one routing category.
///
/// `raw` is the exact byte form the VAA arrived in; handlers that forward the
/// message should forward these bytes rather than re-encoding.
#[async_trait::async_trait]
pub trait VaaPush: Send + Sync {
    async fn push(&self, ctx: &Context, vaa: &Vaa, raw: &[u8]) -> Result<(), PushError>;
}
