//! # Guardian Verification Subsystem (GR-01)
//!
//! Validates a VAA's guardian signatures against a versioned, append-only
//! guardian-set history.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): signer recovery, guardian sets, the
//!   copy-on-write history. No I/O.
//! - **Ports Layer** (`ports/`): `VaaVerifier` (inbound) and
//!   `GuardianSetSource` (outbound refresh feed).
//! - **Service Layer** (`service.rs`): `GuardianSetVerifier`, the quorum check.
//! - **Adapters** (`adapters/`): static source and the background refresh task.
//!
//! ## Verification Rules
//!
//! - Unknown guardian-set index is rejected (`UnknownGuardianSet`)
//! - Guardian indices must be strictly increasing; a repeat can never inflate
//!   the count (`DuplicateSigner`)
//! - Every signature must recover to the guardian key at its index
//!   (`BadSignature`); high-S signatures are rejected
//! - At least `floor(2N/3) + 1` signatures are required (`QuorumNotMet`)

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

// Re-export public API
pub use adapters::refresh::{refresh_once, refresh_task};
pub use adapters::static_source::StaticGuardianSetSource;
pub use domain::ecdsa::{address_from_pubkey, recover_address};
pub use domain::entities::{quorum, EcdsaSignature, GuardianSet};
pub use domain::errors::{GuardianSetError, SignatureError, VerificationError};
pub use domain::history::GuardianSetHistory;
pub use ports::inbound::VaaVerifier;
pub use ports::outbound::GuardianSetSource;
pub use service::GuardianSetVerifier;
