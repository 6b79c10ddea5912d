//! Consumer tunables.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerConfig {
    /// Parallel receive/handle loops.
    pub workers: usize,
    /// Envelopes per receive call.
    pub max_messages: usize,
    /// Per-delivery window; also the handling deadline.
    pub visibility_timeout: Duration,
    /// Pause after a failed receive.
    pub poll_backoff: Duration,
    /// How long shutdown waits for workers before aborting them.
    pub drain_timeout: Duration,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            max_messages: 10,
            visibility_timeout: Duration::from_secs(120),
            poll_backoff: Duration::from_secs(1),
            drain_timeout: Duration::from_secs(10),
        }
    }
}
