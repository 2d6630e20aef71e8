//! Request coalescing by sharing key.

mod registry;

pub use registry::SharingRegistry;
