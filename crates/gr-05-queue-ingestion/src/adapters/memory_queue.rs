//! # In-Memory Queue
//!
//! Single-process queue with SQS-style semantics: a received message is
//! hidden for its visibility window and reappears if not acknowledged in
//! time. Used by the runtime's local mode and by tests.

use crate::domain::envelope::Envelope;
use crate::domain::errors::QueueError;
use crate::ports::outbound::{QueueBackend, QueuePublisher};
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::warn;

/// Default time `receive` waits for a message before returning empty.
pub const DEFAULT_POLL_WAIT: Duration = Duration::from_secs(1);

struct Message {
    id: String,
    body: Bytes,
    receive_count: u32,
}

struct InFlight {
    message: Message,
    visible_at: Instant,
}

#[derive(Default)]
struct State {
    ready: VecDeque<Message>,
    in_flight: HashMap<String, InFlight>,
    dead_letters: Vec<Envelope>,
    next_id: u64,
    next_receipt: u64,
}

impl State {
    /// Move lapsed in-flight messages back to the ready queue.
    fn requeue_expired(&mut self, now: Instant) {
        let expired: Vec<String> = self
            .in_flight
            .iter()
            .filter(|(_, f)| f.visible_at <= now)
            .map(|(receipt, _)| receipt.clone())
            .collect();
        for receipt in expired {
            if let Some(f) = self.in_flight.remove(&receipt) {
                self.ready.push_back(f.message);
            }
        }
    }

    fn next_visible_at(&self) -> Option<Instant> {
        self.in_flight.values().map(|f| f.visible_at).min()
    }
}

pub struct InMemoryQueue {
    state: Mutex<State>,
    notify: Notify,
    poll_wait: Duration,
    max_receives: Option<u32>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            notify: Notify::new(),
            poll_wait: DEFAULT_POLL_WAIT,
            max_receives: None,
        }
    }

    /// How long an empty `receive` waits for a message.
    #[must_use]
    pub fn with_poll_wait(mut self, poll_wait: Duration) -> Self {
        self.poll_wait = poll_wait;
        self
    }

    /// Move a message to the dead-letter list instead of delivering it a
    /// `max_receives + 1`-th time.
    #[must_use]
    pub fn with_max_receives(mut self, max_receives: u32) -> Self {
        self.max_receives = Some(max_receives);
        self
    }

    /// Messages waiting to be received (not counting in-flight ones).
    pub fn ready_len(&self) -> usize {
        self.state.lock().ready.len()
    }

    pub fn in_flight_len(&self) -> usize {
        self.state.lock().in_flight.len()
    }

    /// Nothing ready and nothing in flight.
    pub fn is_drained(&self) -> bool {
        let state = self.state.lock();
        state.ready.is_empty() && state.in_flight.is_empty()
    }

    pub fn dead_letters(&self) -> Vec<Envelope> {
        self.state.lock().dead_letters.clone()
    }

    fn take_batch(&self, max: usize, visibility: Duration) -> Vec<Envelope> {
        let now = Instant::now();
        let mut state = self.state.lock();
        state.requeue_expired(now);

        let mut batch = Vec::new();
        while batch.len() < max {
            let Some(mut message) = state.ready.pop_front() else {
                break;
            };
            message.receive_count += 1;

            if self.max_receives.is_some_and(|m| message.receive_count > m) {
                warn!(
                    envelope_id = %message.id,
                    receive_count = message.receive_count,
                    "Moving message to dead-letter list"
                );
                state.dead_letters.push(Envelope {
                    id: message.id,
                    receipt: String::new(),
                    receive_count: message.receive_count,
                    body: message.body,
                });
                continue;
            }

            state.next_receipt += 1;
            let receipt = format!("{}#{}", message.id, state.next_receipt);
            batch.push(Envelope {
                id: message.id.clone(),
                receipt: receipt.clone(),
                receive_count: message.receive_count,
                body: message.body.clone(),
            });
            state.in_flight.insert(
                receipt,
                InFlight {
                    message,
                    visible_at: now + visibility,
                },
            );
        }
        batch
    }
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl QueueBackend for InMemoryQueue {
    async fn receive(&self, max: usize, visibility: Duration) -> Result<Vec<Envelope>, QueueError> {
        let give_up_at = Instant::now() + self.poll_wait;

        loop {
            let batch = self.take_batch(max, visibility);
            if !batch.is_empty() {
                return Ok(batch);
            }

            let now = Instant::now();
            if now >= give_up_at {
                return Ok(Vec::new());
            }
            let wake_at = self
                .state
                .lock()
                .next_visible_at()
                .map_or(give_up_at, |v| v.min(give_up_at));

            tokio::select! {
                _ = self.notify.notified() => {}
                _ = tokio::time::sleep_until(wake_at) => {}
            }
        }
    }

    async fn acknowledge(&self, envelope: &Envelope) -> Result<(), QueueError> {
        self.state
            .lock()
            .in_flight
            .remove(&envelope.receipt)
            .map(|_| ())
            .ok_or_else(|| QueueError::UnknownReceipt(envelope.receipt.clone()))
    }
}

#[async_trait::async_trait]
impl QueuePublisher for InMemoryQueue {
    async fn publish(&self, body: Bytes) -> Result<(), QueueError> {
        {
            let mut state = self.state.lock();
            state.next_id += 1;
            let id = format!("msg-{}", state.next_id);
            state.ready.push_back(Message {
                id,
                body,
                receive_count: 0,
            });
        }
        self.notify.notify_one();
        Ok(())
    }
}
