//! Shared test fixtures.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use gr_01_guardian_verification::test_helpers::{guardian_keys, guardian_set, GuardianKey};
use gr_01_guardian_verification::{GuardianSetHistory, GuardianSetVerifier};
use gr_02_deduplication::Deduplicator;
use gr_03_message_routing::{BroadcastPush, MessageRouter, RouteTable};
use gr_04_payload_parsing::{
    InMemoryRepository, ParseResponse, ParserError, PayloadParser, PayloadProcessor,
};
use gr_05_queue_ingestion::{
    ConsumerConfig, InMemoryQueue, ParsingHandler, QueueConsumer, QueuePublishPush,
};
use shared_types::{ChainId, EmitterAddress};

/// Parser that replays scripted outcomes, then succeeds.
#[derive(Default)]
pub struct ScriptedParser {
    script: Mutex<VecDeque<ParserError>>,
    calls: AtomicUsize,
}

impl ScriptedParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next call with `err`.
    pub fn fail_next(&self, err: ParserError) -> &Self {
        self.script.lock().push_back(err);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PayloadParser for ScriptedParser {
    async fn parse(
        &self,
        chain: ChainId,
        emitter_address: &EmitterAddress,
        sequence: u64,
        payload: &[u8],
    ) -> Result<ParseResponse, ParserError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.script.lock().pop_front() {
            return Err(err);
        }
        Ok(ParseResponse {
            app_id: "PORTAL_TOKEN_BRIDGE".to_string(),
            result: serde_json::json!({
                "chain": chain.0,
                "emitter": emitter_address.to_hex(),
                "sequence": sequence,
                "payloadLen": payload.len(),
            }),
        })
    }
}

/// The local-mode pipeline assembled from the public crate APIs.
pub struct Pipeline {
    pub keys: Vec<GuardianKey>,
    pub verifier: Arc<GuardianSetVerifier>,
    pub oracle: Arc<BroadcastPush>,
    pub queue: Arc<InMemoryQueue>,
    pub router: Arc<MessageRouter>,
    pub parser: Arc<ScriptedParser>,
    pub repository: Arc<InMemoryRepository>,
    pub consumer: Arc<QueueConsumer>,
}

impl Pipeline {
    /// `guardians` keys in set 0; the consumer's visibility window is
    /// `visibility`.
    pub fn new(guardians: usize, visibility: Duration) -> Self {
        let keys = guardian_keys(guardians);
        let history = GuardianSetHistory::from_sets([guardian_set(0, &keys)])
            .unwrap_or_else(|e| panic!("fixture history: {e}"));
        let verifier = Arc::new(GuardianSetVerifier::new(Arc::new(history)));

        let oracle = Arc::new(BroadcastPush::new(64));
        let queue = Arc::new(InMemoryQueue::new().with_poll_wait(Duration::from_millis(100)));
        let router = Arc::new(MessageRouter::new(
            verifier.clone(),
            Arc::new(Deduplicator::default()),
            RouteTable::price_oracle_split(
                oracle.clone(),
                Arc::new(QueuePublishPush::new(queue.clone())),
            ),
        ));

        let parser = Arc::new(ScriptedParser::new());
        let repository = Arc::new(InMemoryRepository::new());
        let processor = Arc::new(PayloadProcessor::new(parser.clone(), repository.clone()));
        let consumer = Arc::new(QueueConsumer::new(
            queue.clone(),
            Arc::new(ParsingHandler::new(
                verifier.clone(),
                Arc::new(Deduplicator::default()),
                processor,
            )),
            ConsumerConfig {
                workers: 2,
                max_messages: 10,
                visibility_timeout: visibility,
                poll_backoff: Duration::from_millis(50),
                drain_timeout: Duration::from_secs(1),
            },
        ));

        Self {
            keys,
            verifier,
            oracle,
            queue,
            router,
            parser,
            repository,
            consumer,
        }
    }
}

/// Poll `cond` every 10ms, panicking after `limit`.
pub async fn eventually(limit: Duration, cond: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + limit;
    while !cond() {
        if tokio::time::Instant::now() >= deadline {
            panic!("condition not reached within {limit:?}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
