//! # Relay Runtime Library
//!
//! Wiring and lifecycle for the Guardian-Relay process. The entry point is
//! the `guardian-relay` binary in `main.rs`.
//!
//! ## Local-Mode Pipeline
//!
//! ```text
//! gossip feed ──→ MessageRouter (verify, dedup)
//!                   │
//!                   ├─ Pythnet ──→ oracle broadcast ──→ oracle sink
//!                   │
//!                   └─ other ───→ InMemoryQueue ──→ QueueConsumer
//!                                                     │
//!                                 ParsingHandler (verify, dedup)
//!                                                     │
//!                                 PayloadProcessor ──→ repository
//! ```
//!
//! ## Background Tasks
//!
//! - gossip feed, queue consumer, oracle sink
//! - dedup sweepers (one per deduplicator)
//! - guardian-set refresh

pub mod adapters;
pub mod container;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{info, warn};

use gr_01_guardian_verification::{refresh_task, GuardianSetSource};
use gr_02_deduplication::sweep_task;
use gr_03_message_routing::GossipFeed;
use shared_types::Context;

pub use container::{ConfigError, RelayConfig, RelayContainer, StorageBackend};

/// Slack on top of the consumer's own drain timeout before the runtime
/// aborts whatever is left.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// The relay runtime: owns the container and every background task.
pub struct RelayRuntime {
    container: Arc<RelayContainer>,
    ctx: Context,
    tasks: JoinSet<()>,
}

impl RelayRuntime {
    pub fn new(container: RelayContainer) -> Self {
        Self {
            container: Arc::new(container),
            ctx: Context::new(),
            tasks: JoinSet::new(),
        }
    }

    pub fn container(&self) -> Arc<RelayContainer> {
        Arc::clone(&self.container)
    }

    /// Root context; cancelled by [`shutdown`](Self::shutdown).
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Spawn every background task, consuming raw gossip VAAs from `gossip`.
    pub fn start(&mut self, gossip: mpsc::Receiver<Bytes>) {
        let c = Arc::clone(&self.container);
        info!("===========================================");
        info!("  Guardian-Relay v{}", env!("CARGO_PKG_VERSION"));
        info!("  Mode: local (in-memory queue)");
        info!("===========================================");

        // The oracle route needs a subscriber before the first push.
        let oracle_rx = c.oracle.subscribe();
        let oracle_ctx = self.ctx.child();
        self.tasks.spawn(async move {
            adapters::oracle_sink::log_oracle_feed(oracle_rx, oracle_ctx).await;
        });

        let consumer = Arc::clone(&c.consumer);
        let consumer_ctx = self.ctx.child();
        self.tasks
            .spawn(async move { consumer.run(consumer_ctx).await });

        let feed = GossipFeed::new(Arc::clone(&c.router), gossip);
        let feed_ctx = self.ctx.child();
        self.tasks.spawn(async move {
            feed.run(feed_ctx).await;
        });

        let sweep_interval = c.config.dedup.sweep_interval;
        for dedup in [&c.gossip_dedup, &c.parse_dedup] {
            self.tasks
                .spawn(sweep_task(Arc::clone(dedup), sweep_interval, self.ctx.child()));
        }

        self.tasks.spawn(refresh_task(
            Arc::clone(&c.history),
            Arc::clone(&c.guardian_source) as Arc<dyn GuardianSetSource>,
            c.config.guardian.refresh_interval,
            self.ctx.child(),
        ));

        info!(tasks = self.tasks.len(), "Relay started");
    }

    /// Cancel every task and wait for them to finish, aborting stragglers
    /// once the drain timeout has passed.
    pub async fn shutdown(mut self) {
        info!("Initiating graceful shutdown...");
        self.ctx.cancel();

        let limit = self.container.config.shutdown.drain_timeout + SHUTDOWN_GRACE;
        let tasks = &mut self.tasks;
        let drained = tokio::time::timeout(limit, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!(remaining = self.tasks.len(), "Tasks still running, aborting");
            self.tasks.shutdown().await;
        }

        let stats = self.container.consumer.stats().snapshot();
        info!(
            received = stats.received,
            acked = stats.acked,
            terminal = stats.terminal,
            retryable = stats.retryable,
            "Shutdown complete"
        );
    }
}
