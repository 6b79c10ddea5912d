//! Background TTL sweep.

use crate::service::Deduplicator;
use shared_types::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Sweep `dedup` every `interval` until `ctx` is cancelled.
pub async fn sweep_task(dedup: Arc<Deduplicator>, interval: Duration, ctx: Context) {
    let mut sweep_interval = tokio::time::interval(interval);
    sweep_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ctx.cancelled() => break,
            _ = sweep_interval.tick() => {}
        }
        let removed = dedup.sweep();
        if removed > 0 {
            debug!(removed = removed, remaining = dedup.len(), "Swept expired dedup entries");
        }
    }
}
