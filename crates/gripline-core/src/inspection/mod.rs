//! Inspection result contract.
//!
//! - `InspectionResult`: immutable verdict on one inbound request.
//! - `LastEventIds`: per-channel delivery cursors carried by the verdict.
//!
//! Both are plain values: construct once, read from any number of tasks.

mod cursor;
mod result;

pub use cursor::LastEventIds;
pub use result::{InspectionResult, InspectionResultBuilder};
