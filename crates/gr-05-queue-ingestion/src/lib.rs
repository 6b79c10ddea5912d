//! # Queue Ingestion Subsystem (GR-05)
//!
//! Pulls VAAs from an at-least-once queue and feeds them to an
//! `EnvelopeHandler`.
//!
//! ## Acknowledgement Rules
//!
//! | Handler result     | Action                                  |
//! |--------------------|-----------------------------------------|
//! | `Ok`               | acknowledge                             |
//! | terminal error     | log at error with MessageID, acknowledge |
//! | retryable error    | log at warn, leave for redelivery       |
//!
//! Each envelope is handled under a deadline equal to the end of its
//! visibility window, so a slow handler gives up before the queue hands the
//! message to another worker.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::handlers::{ParsingHandler, RoutingHandler};
pub use adapters::memory_queue::InMemoryQueue;
pub use adapters::publish_push::QueuePublishPush;
pub use domain::config::ConsumerConfig;
pub use domain::envelope::Envelope;
pub use domain::errors::{HandlerError, QueueError};
pub use domain::stats::{ConsumerStats, ConsumerStatsSnapshot};
pub use ports::inbound::EnvelopeHandler;
pub use ports::outbound::{QueueBackend, QueuePublisher};
pub use service::QueueConsumer;
