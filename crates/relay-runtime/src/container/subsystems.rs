//! # Subsystem Container
//!
//! Holds every subsystem instance, built from a [`RelayConfig`] in
//! dependency order:
//!
//! ```text
//! Level 0: Guardian-set history, verifier
//! Level 1: Deduplicators (gossip side, parsing side)
//! Level 2: Oracle broadcast, in-memory queue, router
//! Level 3: Decode service, repository, payload processor
//! Level 4: Queue consumer
//! ```
//!
//! The gossip side and the parsing side each own a deduplicator: a message
//! the router has published must still be processed once by the consumer.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use tracing::info;

use gr_01_guardian_verification::{
    GuardianSet, GuardianSetHistory, GuardianSetVerifier, StaticGuardianSetSource,
};
use gr_02_deduplication::Deduplicator;
use gr_03_message_routing::{BroadcastPush, MessageRouter, RouteTable};
use gr_04_payload_parsing::{
    HttpPayloadParser, InMemoryRepository, ParsedVaaRepository, PayloadParser, PayloadProcessor,
};
use gr_05_queue_ingestion::{InMemoryQueue, ParsingHandler, QueueConsumer, QueuePublishPush};

use crate::container::config::{RelayConfig, StorageBackend};

/// Central container holding all subsystem instances.
pub struct RelayContainer {
    pub config: RelayConfig,

    // =========================================================================
    // LEVEL 0: Guardian verification
    // =========================================================================
    pub history: Arc<GuardianSetHistory>,
    /// Refresh feed for the history; new rotations are published here.
    pub guardian_source: Arc<StaticGuardianSetSource>,
    pub verifier: Arc<GuardianSetVerifier>,

    // =========================================================================
    // LEVEL 1: Deduplication
    // =========================================================================
    pub gossip_dedup: Arc<Deduplicator>,
    pub parse_dedup: Arc<Deduplicator>,

    // =========================================================================
    // LEVEL 2: Routing
    // =========================================================================
    /// Price-oracle fan-out.
    pub oracle: Arc<BroadcastPush>,
    /// Generic category queue, drained by the consumer.
    pub queue: Arc<InMemoryQueue>,
    pub router: Arc<MessageRouter>,

    // =========================================================================
    // LEVEL 3-4: Parsing and ingestion
    // =========================================================================
    pub repository: Arc<dyn ParsedVaaRepository>,
    pub processor: Arc<PayloadProcessor>,
    pub consumer: Arc<QueueConsumer>,
}

impl RelayContainer {
    /// Build with the decode service and repository named by `config`.
    pub fn new(config: RelayConfig) -> Result<Self> {
        let parser = HttpPayloadParser::new(&config.parser.base_url, config.parser.timeout)
            .context("Failed to build decode-service client")?;
        let repository = open_repository(&config)?;
        Self::with_backends(config, Arc::new(parser), repository)
    }

    /// Build around an explicit decode service and repository.
    pub fn with_backends(
        config: RelayConfig,
        parser: Arc<dyn PayloadParser>,
        repository: Arc<dyn ParsedVaaRepository>,
    ) -> Result<Self> {
        info!("Initializing subsystems");

        let sets: Vec<GuardianSet> = config
            .guardian
            .sets
            .iter()
            .enumerate()
            .map(|(index, keys)| GuardianSet::new(index as u32, keys.clone()))
            .collect();
        let history = Arc::new(
            GuardianSetHistory::from_sets(sets.clone())
                .context("Invalid guardian-set history")?,
        );
        let guardian_source = Arc::new(StaticGuardianSetSource::new(sets));
        let verifier = Arc::new(GuardianSetVerifier::new(Arc::clone(&history)));
        info!(
            sets = history.len(),
            latest = history.next_index().saturating_sub(1),
            "[gr-01] Guardian verification ready"
        );

        let gossip_dedup = Arc::new(Deduplicator::new(config.dedup_config()));
        let parse_dedup = Arc::new(Deduplicator::new(config.dedup_config()));
        info!(ttl_secs = config.dedup.ttl.as_secs(), "[gr-02] Deduplication ready");

        let oracle = Arc::new(BroadcastPush::new(config.queue.oracle_channel_capacity));
        let mut queue = InMemoryQueue::new();
        if let Some(max) = config.queue.max_receives {
            queue = queue.with_max_receives(max);
        }
        let queue = Arc::new(queue);
        let routes = RouteTable::price_oracle_split(
            Arc::clone(&oracle) as _,
            Arc::new(QueuePublishPush::new(Arc::clone(&queue) as _)),
        );
        let router = Arc::new(MessageRouter::new(
            Arc::clone(&verifier) as _,
            Arc::clone(&gossip_dedup),
            routes,
        ));
        info!("[gr-03] Message routing ready");

        let processor = Arc::new(PayloadProcessor::new(parser, Arc::clone(&repository)));
        info!(parser = %config.parser.base_url, "[gr-04] Payload parsing ready");

        let handler = ParsingHandler::new(
            Arc::clone(&verifier) as _,
            Arc::clone(&parse_dedup),
            Arc::clone(&processor),
        );
        let consumer = Arc::new(QueueConsumer::new(
            Arc::clone(&queue) as _,
            Arc::new(handler),
            config.consumer_config(),
        ));
        info!(workers = config.queue.workers, "[gr-05] Queue ingestion ready");

        Ok(Self {
            config,
            history,
            guardian_source,
            verifier,
            gossip_dedup,
            parse_dedup,
            oracle,
            queue,
            router,
            repository,
            processor,
            consumer,
        })
    }
}

fn open_repository(config: &RelayConfig) -> Result<Arc<dyn ParsedVaaRepository>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory repository");
            Ok(Arc::new(InMemoryRepository::new()))
        }
        #[cfg(feature = "rocksdb")]
        StorageBackend::RocksDb => {
            info!(path = %config.storage.data_dir.display(), "Opening RocksDB repository");
            let repo = gr_04_payload_parsing::RocksDbRepository::open(&config.storage.data_dir)
                .context("Failed to open RocksDB repository")?;
            Ok(Arc::new(repo))
        }
        #[cfg(not(feature = "rocksdb"))]
        StorageBackend::RocksDb => Err(crate::container::ConfigError::RocksDbUnavailable.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_history_from_config() {
        let mut config = RelayConfig::default();
        config.guardian.sets = vec![vec![[1u8; 20]], vec![[2u8; 20], [3u8; 20]]];

        let container = RelayContainer::new(config).unwrap();
        assert_eq!(container.history.len(), 2);
        assert_eq!(container.history.latest().unwrap().keys.len(), 2);
        assert!(container.gossip_dedup.is_empty());
        assert!(!Arc::ptr_eq(&container.gossip_dedup, &container.parse_dedup));
        assert_eq!(container.router.routes().len(), 2);
    }

    #[test]
    fn test_empty_set_fails_to_build() {
        let mut config = RelayConfig::default();
        config.guardian.sets = vec![vec![]];
        assert!(RelayContainer::new(config).is_err());
    }
}
