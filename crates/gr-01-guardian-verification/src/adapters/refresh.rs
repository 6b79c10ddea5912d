//! # Guardian Set Refresh
//!
//! Pulls rotations from a `GuardianSetSource` into the history.

use crate::domain::errors::GuardianSetError;
use crate::domain::history::GuardianSetHistory;
use crate::ports::outbound::GuardianSetSource;
use shared_types::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Fetch and append every set newer than the history's latest.
///
/// Returns how many sets were appended. Sets the history already holds
/// (e.g. appended concurrently by another refresher) are skipped.
pub async fn refresh_once(
    history: &GuardianSetHistory,
    source: &dyn GuardianSetSource,
) -> Result<usize, GuardianSetError> {
    let next = history.next_index();
    let fetched = source.fetch_from(next).await?;

    let mut appended = 0;
    for set in fetched {
        if set.index < history.next_index() {
            continue;
        }
        history.append(set)?;
        appended += 1;
    }
    Ok(appended)
}

/// Periodically refresh until `ctx` is cancelled.
///
/// Source errors are logged and retried on the next tick.
pub async fn refresh_task(
    history: Arc<GuardianSetHistory>,
    source: Arc<dyn GuardianSetSource>,
    interval: Duration,
    ctx: Context,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ctx.cancelled() => break,
            _ = ticker.tick() => {}
        }
        match refresh_once(&history, source.as_ref()).await {
            Ok(0) => {}
            Ok(appended) => debug!(appended, latest = history.next_index() - 1, "Guardian sets refreshed"),
            Err(e) => warn!(error = %e, "Guardian set refresh failed"),
        }
    }
}
