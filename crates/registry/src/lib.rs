//! Observer registry: the flat set of viewpoints every managed object is
//! evaluated against.
//!
//! # Invariants
//! - Observers keep registration order; that order is the binding order.
//! - Every add/remove bumps the generation and yields a `RegistryChange`.
//! - Moving an observer is not a registry change.

pub mod observer;
pub mod registry;

pub use observer::{Observer, ViewVolume};
pub use registry::{ObserverRegistry, RegistryChange};

pub fn crate_info() -> &'static str {
    "sightline-registry v0.1.0"
}
