//! Routes a category onto a queue: the raw VAA is published as-is.

use crate::ports::outbound::QueuePublisher;
use bytes::Bytes;
use gr_03_message_routing::{PushError, VaaPush};
use shared_types::{Context, Vaa};
use std::sync::Arc;

pub struct QueuePublishPush {
    publisher: Arc<dyn QueuePublisher>,
}

impl QueuePublishPush {
    pub fn new(publisher: Arc<dyn QueuePublisher>) -> Self {
        Self { publisher }
    }
}

#[async_trait::async_trait]
impl VaaPush for QueuePublishPush {
    async fn push(&self, ctx: &Context, _vaa: &Vaa, raw: &[u8]) -> Result<(), PushError> {
        ctx.run(self.publisher.publish(Bytes::copy_from_slice(raw)))
            .await?
            .map_err(|e| PushError::Unavailable(e.to_string()))
    }
}
