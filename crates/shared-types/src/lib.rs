//! # Shared Types Crate
//!
//! Domain vocabulary shared by every Guardian-Relay subsystem.
//!
//! ## Contents
//!
//! - **Entities** (`entities`): the [`Vaa`], its guardian signatures, the
//!   [`ChainId`] newtype and the [`MessageId`] deduplication/storage key.
//! - **Envelope** (`envelope`): the VAA v1 binary wire format.
//! - **Context** (`context`): cancellation + deadline carried through every
//!   suspension point.
//! - **Errors** (`errors`): [`DecodeError`] and the terminal/retryable
//!   [`Disposition`] vocabulary used by the ingestion layer to decide
//!   acknowledgement.

pub mod context;
pub mod entities;
pub mod envelope;
pub mod errors;

pub use context::{Context, Interrupted};
pub use entities::*;
pub use errors::*;
