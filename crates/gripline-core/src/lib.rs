//! gripline core: the inspection result contract and the shared error type.
//!
//! This crate defines the value an inspection authority hands to the request
//! router, plus the error surface shared by the gateway. It carries no
//! transport or runtime dependencies so producers (inspection clients) and
//! consumers (routers, channel layers) can depend on it alone.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Contract breaches surface as `GriplineError::ContractViolation` at
//! construction time.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod inspection;

/// Error surface shared with the gateway.
pub use error::{GriplineError, Result, Unavailable};
pub use inspection::{InspectionResult, InspectionResultBuilder, LastEventIds};
