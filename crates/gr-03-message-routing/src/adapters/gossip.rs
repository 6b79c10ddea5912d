//! # Gossip Feed
//!
//! Drives the router from a channel of raw VAAs as observed on the guardian
//! gossip network. Gossip has no redelivery: a message that fails here is
//! logged and dropped, and the network's own rebroadcast is the retry.

use crate::service::MessageRouter;
use bytes::Bytes;
use shared_types::{Classify, Context, Vaa};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Counts from one `GossipFeed::run`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedSummary {
    pub received: u64,
    pub malformed: u64,
    pub delivered: u64,
    pub failed: u64,
}

pub struct GossipFeed {
    router: Arc<MessageRouter>,
    rx: mpsc::Receiver<Bytes>,
}

impl GossipFeed {
    pub fn new(router: Arc<MessageRouter>, rx: mpsc::Receiver<Bytes>) -> Self {
        Self { router, rx }
    }

    /// Consume until the channel closes or `ctx` is cancelled.
    pub async fn run(mut self, ctx: Context) -> FeedSummary {
        let mut summary = FeedSummary::default();

        loop {
            let raw = tokio::select! {
                biased;
                _ = ctx.cancelled() => break,
                msg = self.rx.recv() => match msg {
                    Some(raw) => raw,
                    None => break,
                },
            };
            summary.received += 1;

            let vaa = match Vaa::decode(&raw) {
                Ok(vaa) => vaa,
                Err(e) => {
                    summary.malformed += 1;
                    warn!(error = %e, len = raw.len(), "Dropping malformed gossip VAA");
                    continue;
                }
            };

            match self.router.push(&ctx.child(), &vaa, &raw).await {
                Ok(()) => summary.delivered += 1,
                Err(e) => {
                    summary.failed += 1;
                    warn!(
                        message_id = %vaa.message_id(),
                        retryable = e.disposition().is_retryable(),
                        error = %e,
                        "Gossip VAA not delivered"
                    );
                }
            }
        }

        info!(
            received = summary.received,
            delivered = summary.delivered,
            malformed = summary.malformed,
            failed = summary.failed,
            "Gossip feed stopped"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::broadcast::BroadcastPush;
    use crate::adapters::closure::push_fn;
    use crate::domain::route_table::RouteTable;
    use gr_01_guardian_verification::test_helpers::{guardian_keys, guardian_set, signed_vaa};
    use gr_01_guardian_verification::{GuardianSetHistory, GuardianSetVerifier};
    use gr_02_deduplication::Deduplicator;
    use shared_types::ChainId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_feed_routes_until_channel_closes() {
        let keys = guardian_keys(4);
        let history = GuardianSetHistory::from_sets([guardian_set(0, &keys)]).unwrap();
        let oracle = Arc::new(BroadcastPush::new(16));
        let mut prices = oracle.subscribe();
        let generic_calls = Arc::new(AtomicUsize::new(0));
        let generic = {
            let calls = Arc::clone(&generic_calls);
            push_fn(move |_, _, _| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
        };
        let router = Arc::new(MessageRouter::new(
            Arc::new(GuardianSetVerifier::new(Arc::new(history))),
            Arc::new(Deduplicator::default()),
            RouteTable::price_oracle_split(oracle, Arc::new(generic)),
        ));

        let (tx, rx) = mpsc::channel(16);
        let price = signed_vaa(0, &keys, 3, ChainId::PYTHNET, 1, b"price").encode().unwrap();
        let transfer = signed_vaa(0, &keys, 3, ChainId::ETHEREUM, 1, b"xfer").encode().unwrap();
        let unsigned = signed_vaa(0, &keys, 1, ChainId::ETHEREUM, 2, b"xfer").encode().unwrap();

        tx.send(Bytes::from(price.clone())).await.unwrap();
        tx.send(Bytes::from(transfer.clone())).await.unwrap();
        tx.send(Bytes::from(transfer)).await.unwrap();
        tx.send(Bytes::from(unsigned)).await.unwrap();
        tx.send(Bytes::from_static(b"\x01\x00")).await.unwrap();
        drop(tx);

        let summary = GossipFeed::new(router, rx).run(Context::new()).await;

        assert_eq!(
            summary,
            FeedSummary {
                received: 5,
                malformed: 1,
                delivered: 3,
                failed: 1,
            }
        );
        assert_eq!(prices.recv().await.unwrap(), Bytes::from(price));
        assert_eq!(generic_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_feed_stops_on_cancel() {
        let history = GuardianSetHistory::from_sets([guardian_set(0, &guardian_keys(1))]).unwrap();
        let router = Arc::new(MessageRouter::new(
            Arc::new(GuardianSetVerifier::new(Arc::new(history))),
            Arc::new(Deduplicator::default()),
            RouteTable::new(),
        ));
        let (_tx, rx) = mpsc::channel(1);
        let ctx = Context::new();
        ctx.cancel();

        let summary = GossipFeed::new(router, rx).run(ctx).await;
        assert_eq!(summary.received, 0);
    }
}
