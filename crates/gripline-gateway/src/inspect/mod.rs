//! Inspection side of the router.
//!
//! `InspectionClient` is the seam to the application-defined inspection
//! service; `Inspector` wraps it with a deadline and turns every kind of
//! unavailability into a substitute result, so a failed inspection degrades
//! to "do not proxy" (or "proxy unshared" when failing open) instead of
//! failing the request.

mod client;
mod inspector;

pub use client::InspectionClient;
pub use inspector::{InspectSettings, InspectionOutcome, Inspector, OutcomeSource};
