//! # Ports Layer
//!
//! - **Outbound (Driven)**: `VaaPush`, one implementation per routing category

pub mod outbound;
