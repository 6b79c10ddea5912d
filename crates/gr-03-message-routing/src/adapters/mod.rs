//! # Adapters Module
//!
//! Downstream push adapters and the gossip feed driver.

pub mod broadcast;
pub mod closure;
pub mod gossip;
