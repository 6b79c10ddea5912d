//! # Ingestion Flow
//!
//! Gossip → MessageRouter → InMemoryQueue → QueueConsumer → PayloadProcessor
//! → repository, exercised through public crate APIs only.
//!
//! ## Scenarios
//!
//! 1. A generic VAA is persisted once; a price-oracle VAA only reaches the
//!    broadcast channel.
//! 2. A decode-service outage leaves the envelope unacknowledged; the
//!    redelivery re-invokes the parser and persists the record.
//! 3. An unparseable payload is acknowledged without a write.
//! 4. Processing the same VAA twice leaves one record with the later
//!    `updated_at`.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bytes::Bytes;
    use tokio::sync::mpsc;

    use gr_01_guardian_verification::test_helpers::signed_vaa;
    use gr_03_message_routing::GossipFeed;
    use gr_04_payload_parsing::{ParsedVaaRepository, ParserError, PayloadProcessor};
    use gr_05_queue_ingestion::{QueueBackend, QueuePublisher};
    use shared_types::{ChainId, Context};

    use crate::fixtures::{eventually, Pipeline, ScriptedParser};

    const VISIBILITY: Duration = Duration::from_secs(5);

    fn spawn_consumer(p: &Pipeline, ctx: &Context) -> tokio::task::JoinHandle<()> {
        let consumer = Arc::clone(&p.consumer);
        let ctx = ctx.child();
        tokio::spawn(async move { consumer.run(ctx).await })
    }

    #[tokio::test]
    async fn test_gossip_to_repository() {
        let p = Pipeline::new(7, VISIBILITY);
        let ctx = Context::new();
        let mut oracle_rx = p.oracle.subscribe();

        let (tx, rx) = mpsc::channel(16);
        let feed = tokio::spawn(GossipFeed::new(Arc::clone(&p.router), rx).run(ctx.child()));
        let consumer = spawn_consumer(&p, &ctx);

        let transfer = signed_vaa(0, &p.keys, 5, ChainId::ETHEREUM, 100, b"transfer");
        let price = signed_vaa(0, &p.keys, 5, ChainId::PYTHNET, 7, b"price");
        for vaa in [&transfer, &transfer, &price] {
            tx.send(Bytes::from(vaa.encode().unwrap())).await.unwrap();
        }
        tx.send(Bytes::from_static(b"\x01garbage")).await.unwrap();
        drop(tx);

        let summary = feed.await.unwrap();
        assert_eq!(summary.received, 4);
        assert_eq!(summary.malformed, 1);
        assert_eq!(summary.delivered, 3);

        assert_eq!(oracle_rx.recv().await.unwrap(), Bytes::from(price.encode().unwrap()));

        eventually(Duration::from_secs(5), || {
            !p.repository.is_empty() && p.queue.is_drained()
        })
        .await;
        ctx.cancel();
        consumer.await.unwrap();

        let record = p
            .repository
            .get(&transfer.message_id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.app_id, "PORTAL_TOKEN_BRIDGE");
        assert_eq!(record.emitter_chain, ChainId::ETHEREUM.0);
        assert_eq!(record.sequence, "100");
        assert!(p.repository.get(&price.message_id()).await.unwrap().is_none());
        assert_eq!(p.parser.calls(), 1);
        assert_eq!(p.repository.writes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parser_outage_redelivers_and_retries() {
        let p = Pipeline::new(4, VISIBILITY);
        p.parser
            .fail_next(ParserError::EndpointCallError("connection refused".into()));

        let vaa = signed_vaa(0, &p.keys, 3, ChainId::SOLANA, 5, b"swap");
        p.router
            .push(&Context::new(), &vaa, &vaa.encode().unwrap())
            .await
            .unwrap();
        assert_eq!(p.queue.ready_len(), 1);

        let ctx = Context::new();
        let consumer = spawn_consumer(&p, &ctx);

        // First delivery fails and stays in flight until visibility lapses.
        eventually(Duration::from_secs(1), || p.parser.calls() == 1).await;
        assert_eq!(p.queue.in_flight_len(), 1);
        assert!(p.repository.is_empty());

        eventually(VISIBILITY * 3, || p.queue.is_drained()).await;
        ctx.cancel();
        consumer.await.unwrap();

        assert_eq!(p.parser.calls(), 2);
        assert!(p.repository.get(&vaa.message_id()).await.unwrap().is_some());

        let stats = p.consumer.stats().snapshot();
        assert_eq!(stats.retryable, 1);
        assert_eq!(stats.acked, 1);
        assert_eq!(stats.terminal, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unparseable_payload_acked_without_write() {
        let p = Pipeline::new(4, VISIBILITY);
        p.parser
            .fail_next(ParserError::Unparseable("unknown app".into()));

        let vaa = signed_vaa(0, &p.keys, 3, ChainId::APTOS, 1, b"???");
        p.router
            .push(&Context::new(), &vaa, &vaa.encode().unwrap())
            .await
            .unwrap();

        let ctx = Context::new();
        let consumer = spawn_consumer(&p, &ctx);
        eventually(Duration::from_secs(2), || p.queue.is_drained()).await;
        ctx.cancel();
        consumer.await.unwrap();

        assert_eq!(p.parser.calls(), 1);
        assert_eq!(p.repository.writes(), 0);
        assert_eq!(p.consumer.stats().snapshot().acked, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_forged_envelope_is_terminal() {
        let p = Pipeline::new(4, VISIBILITY);
        // Bypass the router so the unverified VAA lands on the queue.
        let forged = signed_vaa(0, &p.keys, 1, ChainId::SOLANA, 3, b"forged");
        p.queue.publish(Bytes::from(forged.encode().unwrap())).await.unwrap();

        let ctx = Context::new();
        let consumer = spawn_consumer(&p, &ctx);
        eventually(Duration::from_secs(2), || p.queue.is_drained()).await;
        ctx.cancel();
        consumer.await.unwrap();

        assert_eq!(p.parser.calls(), 0);
        let stats = p.consumer.stats().snapshot();
        assert_eq!(stats.terminal, 1);
        assert_eq!(stats.acked, 1);
    }

    #[tokio::test]
    async fn test_reprocessing_overwrites_single_record() {
        let p = Pipeline::new(4, VISIBILITY);
        let processor = PayloadProcessor::new(
            Arc::new(ScriptedParser::new()),
            Arc::clone(&p.repository) as Arc<dyn ParsedVaaRepository>,
        );
        let vaa = signed_vaa(0, &p.keys, 3, ChainId::ETHEREUM, 77, b"again");
        let ctx = Context::new();

        let first = processor.process(&ctx, &vaa.encode().unwrap()).await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = processor.process(&ctx, &vaa.encode().unwrap()).await.unwrap().unwrap();

        assert_eq!(p.repository.len(), 1);
        assert_eq!(p.repository.writes(), 2);
        let stored = p.repository.get(&vaa.message_id()).await.unwrap().unwrap();
        assert_eq!(stored.updated_at, second.updated_at);
        assert!(stored.updated_at >= first.updated_at);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queue_receive_respects_batch_size() {
        let p = Pipeline::new(4, VISIBILITY);
        for seq in 0..25u64 {
            let vaa = signed_vaa(0, &p.keys, 3, ChainId::BSC, seq, b"bulk");
            p.router
                .push(&Context::new(), &vaa, &vaa.encode().unwrap())
                .await
                .unwrap();
        }
        assert_eq!(p.queue.ready_len(), 25);

        let batch = p.queue.receive(10, VISIBILITY).await.unwrap();
        assert_eq!(batch.len(), 10);
        assert_eq!(p.queue.ready_len(), 15);
    }
}
