//! Shared identifiers and spatial primitives.

mod types;

pub use types::{BoundingSphere, ObjectId, ObserverId, Transform};

pub fn crate_info() -> &'static str {
    "sightline-common v0.1.0"
}
