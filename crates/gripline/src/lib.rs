//! Top-level facade crate for gripline.
//!
//! Re-exports the inspection contract and the gateway library so users can
//! depend on a single crate.

pub mod core {
    pub use gripline_core::*;
}

pub mod gateway {
    pub use gripline_gateway::*;
}
