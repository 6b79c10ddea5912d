//! In-process fan-out for the price-oracle category.

use crate::domain::errors::PushError;
use crate::ports::outbound::VaaPush;
use bytes::Bytes;
use shared_types::{Context, Vaa};
use tokio::sync::broadcast;

/// Publishes each raw VAA to every current subscriber.
///
/// Slow subscribers lag and lose the oldest messages rather than stalling
/// the router.
#[derive(Debug, Clone)]
pub struct BroadcastPush {
    tx: broadcast::Sender<Bytes>,
}

impl BroadcastPush {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Bytes> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait::async_trait]
impl VaaPush for BroadcastPush {
    async fn push(&self, _ctx: &Context, _vaa: &Vaa, raw: &[u8]) -> Result<(), PushError> {
        self.tx
            .send(Bytes::copy_from_slice(raw))
            .map(|_| ())
            .map_err(|_| PushError::Unavailable("no price-oracle subscribers".to_string()))
    }
}
