//! `VaaPush` from an async closure.

use crate::domain::errors::PushError;
use crate::ports::outbound::VaaPush;
use bytes::Bytes;
use shared_types::{Context, Vaa};
use std::future::Future;

/// Handler backed by a closure taking owned copies of its arguments.
pub struct PushFn<F>(F);

/// Wrap `f` as a `VaaPush`.
///
/// ```ignore
/// let handler = push_fn(|_ctx, vaa, _raw| async move {
///     tracing::info!(sequence = vaa.sequence, "received");
///     Ok(())
/// });
/// ```
pub fn push_fn<F, Fut>(f: F) -> PushFn<F>
where
    F: Fn(Context, Vaa, Bytes) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), PushError>> + Send,
{
    PushFn(f)
}

#[async_trait::async_trait]
impl<F, Fut> VaaPush for PushFn<F>
where
    F: Fn(Context, Vaa, Bytes) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), PushError>> + Send,
{
    async fn push(&self, ctx: &Context, vaa: &Vaa, raw: &[u8]) -> Result<(), PushError> {
        (self.0)(ctx.clone(), vaa.clone(), Bytes::copy_from_slice(raw)).await
    }
}
