//! # Queue Consumer
//!
//! `workers` independent loops, each: receive a batch, handle every envelope
//! under a deadline at the end of its visibility window, acknowledge per the
//! handler's disposition.
//!
//! Shutdown: cancelling the root context stops receiving and skips the rest
//! of the current batch. The envelope being handled keeps a context of its
//! own, bounded only by its visibility deadline, so it can finish and be
//! acknowledged during the drain. Workers that have not returned within
//! `drain_timeout` are aborted; their envelopes stay unacknowledged and are
//! redelivered.

use crate::domain::config::ConsumerConfig;
use crate::domain::envelope::Envelope;
use crate::domain::stats::ConsumerStats;
use crate::ports::inbound::EnvelopeHandler;
use crate::ports::outbound::QueueBackend;
use shared_types::{Classify, Context, Interrupted};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

pub struct QueueConsumer {
    backend: Arc<dyn QueueBackend>,
    handler: Arc<dyn EnvelopeHandler>,
    config: ConsumerConfig,
    stats: Arc<ConsumerStats>,
}

impl QueueConsumer {
    pub fn new(
        backend: Arc<dyn QueueBackend>,
        handler: Arc<dyn EnvelopeHandler>,
        config: ConsumerConfig,
    ) -> Self {
        Self {
            backend,
            handler,
            config,
            stats: Arc::new(ConsumerStats::default()),
        }
    }

    pub fn stats(&self) -> &Arc<ConsumerStats> {
        &self.stats
    }

    /// Consume until `ctx` is cancelled, then drain.
    pub async fn run(&self, ctx: Context) {
        let mut workers = JoinSet::new();
        for worker_id in 0..self.config.workers.max(1) {
            let worker = Worker {
                id: worker_id,
                backend: Arc::clone(&self.backend),
                handler: Arc::clone(&self.handler),
                config: self.config,
                stats: Arc::clone(&self.stats),
            };
            workers.spawn(worker.run(ctx.child()));
        }
        info!(workers = workers.len(), "Queue consumer started");

        ctx.cancelled().await;
        info!(
            drain_timeout_ms = self.config.drain_timeout.as_millis() as u64,
            "Queue consumer draining"
        );

        let drained = tokio::time::timeout(self.config.drain_timeout, async {
            while workers.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!(remaining = workers.len(), "Drain timeout elapsed, aborting workers");
            workers.shutdown().await;
        }
        info!("Queue consumer stopped");
    }
}

struct Worker {
    id: usize,
    backend: Arc<dyn QueueBackend>,
    handler: Arc<dyn EnvelopeHandler>,
    config: ConsumerConfig,
    stats: Arc<ConsumerStats>,
}

impl Worker {
    async fn run(self, ctx: Context) {
        debug!(worker = self.id, "Worker started");

        loop {
            let received = ctx
                .run(
                    self.backend
                        .receive(self.config.max_messages, self.config.visibility_timeout),
                )
                .await;

            let batch = match received {
                Err(Interrupted::Cancelled) | Err(Interrupted::DeadlineExceeded) => break,
                Ok(Err(e)) => {
                    self.stats.receive_errors.fetch_add(1, Ordering::Relaxed);
                    warn!(worker = self.id, error = %e, "Receive failed, backing off");
                    if ctx.run(tokio::time::sleep(self.config.poll_backoff)).await.is_err() {
                        break;
                    }
                    continue;
                }
                Ok(Ok(batch)) => batch,
            };

            // The visibility window opened at receipt. Handlers are not
            // tied to the root token; the drain timeout bounds them instead.
            let deadline = Instant::now() + self.config.visibility_timeout;
            let envelope_ctx = Context::new().with_deadline(deadline);
            for envelope in batch {
                if ctx.is_cancelled() {
                    break;
                }
                self.handle(&envelope_ctx, envelope).await;
            }
        }

        debug!(worker = self.id, "Worker stopped");
    }

    async fn handle(&self, ctx: &Context, envelope: Envelope) {
        self.stats.received.fetch_add(1, Ordering::Relaxed);

        match self.handler.handle(ctx, &envelope).await {
            Ok(()) => self.acknowledge(&envelope).await,
            Err(e) if !e.disposition().is_retryable() => {
                self.stats.terminal.fetch_add(1, Ordering::Relaxed);
                error!(
                    message_id = %e.message_id().map(|id| id.as_str()).unwrap_or("-"),
                    envelope_id = %envelope.id,
                    receive_count = envelope.receive_count,
                    error = %e,
                    "Dropping message after terminal failure"
                );
                self.acknowledge(&envelope).await;
            }
            Err(e) => {
                self.stats.retryable.fetch_add(1, Ordering::Relaxed);
                warn!(
                    message_id = %e.message_id().map(|id| id.as_str()).unwrap_or("-"),
                    envelope_id = %envelope.id,
                    receive_count = envelope.receive_count,
                    error = %e,
                    "Message left for redelivery"
                );
            }
        }
    }

    async fn acknowledge(&self, envelope: &Envelope) {
        match self.backend.acknowledge(envelope).await {
            Ok(()) => {
                self.stats.acked.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                warn!(envelope_id = %envelope.id, error = %e, "Acknowledge failed");
            }
        }
    }
}
