//! # Ports Layer
//!
//! - **Outbound (Driven)**: the parser service and the parsed-VAA store

pub mod outbound;
