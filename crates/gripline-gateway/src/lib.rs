//! gripline gateway library entry.
//!
//! The router side of the inspection contract: an inspector that always
//! yields a result (substituting on failure), a coalescing registry keyed by
//! sharing key, and the request router that ties them to the origin and the
//! channel layer. The binary (`main.rs`) only serves the operational
//! endpoints; proxying engines embed `RequestRouter` through `AppState`.

pub mod app_state;
pub mod coalesce;
pub mod config;
pub mod inspect;
pub mod obs;
pub mod ops;
pub mod router;
pub mod routing;
