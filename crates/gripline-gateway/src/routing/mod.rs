//! Request routing: acts on the inspection result.
//!
//! Not proxied -> hand the result back untouched. Proxied -> fetch from the
//! origin (coalesced by sharing key when enabled), then stamp the session
//! context for the channel layer.

mod collaborators;
mod request_router;
mod types;

pub use collaborators::{ChannelHandoff, NoopHandoff, Origin};
pub use request_router::{RequestRouter, RouterSettings, SharedFetch};
pub use types::{InboundRequest, OriginResponse, RouteDecision, SessionContext};
