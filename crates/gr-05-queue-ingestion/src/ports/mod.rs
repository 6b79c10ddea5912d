//! # Ports Layer
//!
//! - **Inbound (Driving)**: `EnvelopeHandler`, what the consumer drives
//! - **Outbound (Driven)**: the queue to receive from and publish to

pub mod inbound;
pub mod outbound;
