//! Level of detail: zone aggregation, observer selection, signal dispatch.
//!
//! An object declares concentric zones around its position. Each registered
//! observer gets one culling binding per object; the aggregator folds every
//! binding's per-zone transitions into counts and reports the innermost zone
//! any observer sees. Once per tick the object resolves that zone and the
//! nearest observer into a [`LodSignal`] for its behavior.
//!
//! # Invariants
//! - `counts[i]` equals the number of bindings currently reporting zone `i` visible.
//! - The nearest zone is the lowest index with a non-zero count, or none.
//! - Disposed bindings never deliver another event.
//! - Registry changes rebind every object before the mutating call returns.

mod aggregator;
mod behavior;
mod config;
mod dispatch;
mod object;
mod proximity;
mod selector;
mod system;
mod zones;

pub use aggregator::{BindingState, ObserverBinding, VisibilityAggregator};
pub use behavior::{Frame, LodBehavior};
pub use config::{ConfigError, LodConfig};
pub use dispatch::{ClosenessMode, LodDispatcher, LodSignal, LodState, resolve};
pub use object::{LodObject, ObjectUpdate};
pub use proximity::{DistanceRange, normalize};
pub use selector::{ObserverSelector, find_nearest_visible};
pub use system::{LodError, LodStats, LodSystem};
pub use zones::{Zone, ZoneError, ZoneSet};

pub fn crate_info() -> &'static str {
    "sightline-lod v0.1.0"
}
