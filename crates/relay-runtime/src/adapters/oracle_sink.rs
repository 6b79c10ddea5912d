//! Local-mode subscriber for the price-oracle broadcast: logs each VAA so
//! the category stays observable without a downstream consumer.

use bytes::Bytes;
use shared_types::{Context, Vaa};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

/// Drain `rx` until `ctx` is cancelled or the channel closes. Returns how
/// many VAAs were seen.
pub async fn log_oracle_feed(mut rx: broadcast::Receiver<Bytes>, ctx: Context) -> u64 {
    let mut seen = 0u64;

    loop {
        let raw = tokio::select! {
            biased;
            _ = ctx.cancelled() => break,
            msg = rx.recv() => match msg {
                Ok(raw) => raw,
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "Oracle sink lagging, messages dropped");
                    continue;
                }
                Err(RecvError::Closed) => break,
            },
        };
        seen += 1;

        match Vaa::decode(&raw) {
            Ok(vaa) => debug!(
                message_id = %vaa.message_id(),
                payload_len = vaa.payload.len(),
                "Price-oracle VAA"
            ),
            Err(e) => warn!(error = %e, "Undecodable price-oracle VAA"),
        }
    }

    info!(seen, "Oracle sink stopped");
    seen
}
