//! # Inbound Ports (Driving Ports / API)

use crate::domain::envelope::Envelope;
use crate::domain::errors::HandlerError;
use shared_types::Context;

/// Work performed for each received envelope.
///
/// `ctx` expires at the end of the envelope's visibility window.
#[async_trait::async_trait]
pub trait EnvelopeHandler: Send + Sync {
    async fn handle(&self, ctx: &Context, envelope: &Envelope) -> Result<(), HandlerError>;
}
