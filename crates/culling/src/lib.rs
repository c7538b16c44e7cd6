//! Culling primitive: per-observer bindings that report sphere visibility
//! transitions.
//!
//! # Invariants
//! - One event per observed transition, never duplicated.
//! - A disposed binding never emits again.
//! - Events are only produced during `CullingBackend::update`.
//! - Sphere buffers are read at update time, never copied per binding.
//!
//! # Workaround
//! `DistanceCulling` stands in for an engine-provided culling service: it runs
//! a per-tick reach/cone test against each observer behind the same
//! event contract. Swap in a native backend without changing consumers.

mod backend;
mod distance;

pub use backend::{
    BindingHandle, CullingBackend, SharedCulling, SphereBuffer, VisibilityEvent, VisibilitySink,
    shared,
};
pub use distance::DistanceCulling;

pub fn crate_info() -> &'static str {
    "sightline-culling v0.1.0"
}
