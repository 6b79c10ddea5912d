//! # Outbound Ports (Driven Ports / SPI)

use crate::domain::envelope::Envelope;
use crate::domain::errors::QueueError;
use bytes::Bytes;
use std::time::Duration;

/// An at-least-once queue with per-delivery visibility windows.
#[async_trait::async_trait]
pub trait QueueBackend: Send + Sync {
    /// Up to `max` envelopes, each hidden from other receivers for
    /// `visibility`. May wait for messages; may return an empty batch.
    async fn receive(&self, max: usize, visibility: Duration) -> Result<Vec<Envelope>, QueueError>;

    /// Remove the message behind `envelope` from the queue.
    async fn acknowledge(&self, envelope: &Envelope) -> Result<(), QueueError>;
}

/// Write side of a queue.
#[async_trait::async_trait]
pub trait QueuePublisher: Send + Sync {
    async fn publish(&self, body: Bytes) -> Result<(), QueueError>;
}
