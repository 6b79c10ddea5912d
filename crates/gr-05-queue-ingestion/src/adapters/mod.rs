//! # Adapters Module
//!
//! Envelope handlers, the in-process queue, and the router-to-queue bridge.

pub mod handlers;
pub mod memory_queue;
pub mod publish_push;
