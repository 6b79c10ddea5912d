//! # Message Routing Subsystem (GR-03)
//!
//! Entry point for VAAs arriving from the gossip network or a queue.
//!
//! ## Flow
//!
//! ```text
//! raw VAA ──► verify quorum ──► select route ──► dedup.apply(id, handler.push)
//!              (terminal)        (terminal)        (handler's disposition)
//! ```
//!
//! Exactly one handler receives each message. The standard table sends
//! Pythnet price attestations to the oracle handler and everything else to the
//! generic handler.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::broadcast::BroadcastPush;
pub use adapters::closure::{push_fn, PushFn};
pub use adapters::gossip::{FeedSummary, GossipFeed};
pub use domain::errors::{PushError, RouterError};
pub use domain::route_table::{RouteTable, FALLBACK_ROUTE};
pub use ports::outbound::VaaPush;
pub use service::MessageRouter;
