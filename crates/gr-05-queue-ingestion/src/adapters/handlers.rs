//! # Envelope Handlers
//!
//! - `RoutingHandler`: a queue feeding the router (same path as gossip).
//! - `ParsingHandler`: a queue feeding the payload processor. Verifies before
//!   any side effect and deduplicates by MessageID.

use crate::domain::envelope::Envelope;
use crate::domain::errors::HandlerError;
use crate::ports::inbound::EnvelopeHandler;
use gr_01_guardian_verification::VaaVerifier;
use gr_02_deduplication::Deduplicator;
use gr_03_message_routing::MessageRouter;
use gr_04_payload_parsing::PayloadProcessor;
use shared_types::{Context, Vaa};
use std::sync::Arc;

pub struct RoutingHandler {
    router: Arc<MessageRouter>,
}

impl RoutingHandler {
    pub fn new(router: Arc<MessageRouter>) -> Self {
        Self { router }
    }
}

#[async_trait::async_trait]
impl EnvelopeHandler for RoutingHandler {
    async fn handle(&self, ctx: &Context, envelope: &Envelope) -> Result<(), HandlerError> {
        let vaa = Vaa::decode(&envelope.body)?;
        self.router
            .push(ctx, &vaa, &envelope.body)
            .await
            .map_err(|source| HandlerError::Routing {
                id: vaa.message_id(),
                source,
            })
    }
}

pub struct ParsingHandler {
    verifier: Arc<dyn VaaVerifier>,
    dedup: Arc<Deduplicator>,
    processor: Arc<PayloadProcessor>,
}

impl ParsingHandler {
    pub fn new(
        verifier: Arc<dyn VaaVerifier>,
        dedup: Arc<Deduplicator>,
        processor: Arc<PayloadProcessor>,
    ) -> Self {
        Self {
            verifier,
            dedup,
            processor,
        }
    }
}

#[async_trait::async_trait]
impl EnvelopeHandler for ParsingHandler {
    async fn handle(&self, ctx: &Context, envelope: &Envelope) -> Result<(), HandlerError> {
        let vaa = Vaa::decode(&envelope.body)?;
        let id = vaa.message_id();

        if let Err(source) = self.verifier.verify(&vaa) {
            return Err(HandlerError::Verification { id, source });
        }

        self.dedup
            .apply(id.as_str(), || async {
                self.processor.process_vaa(ctx, &vaa).await.map(|_| ())
            })
            .await
            .map_err(|source| HandlerError::Processing { id, source })
    }
}
