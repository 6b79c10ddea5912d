//! # Domain Layer
//!
//! Route selection and routing errors.

pub mod errors;
pub mod route_table;
