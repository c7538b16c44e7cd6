use std::rc::Rc;
use std::sync::mpsc::{self, Receiver};

use glam::Vec3;
use sightline_common::{BoundingSphere, ObserverId};
use sightline_culling::{
    BindingHandle, SharedCulling, SphereBuffer, VisibilityEvent, VisibilitySink,
};
use sightline_registry::Observer;

/// Owns one culling binding and disposes it when dropped.
struct BindingGuard {
    handle: BindingHandle,
    culling: SharedCulling,
}

impl Drop for BindingGuard {
    fn drop(&mut self) {
        match self.culling.try_borrow_mut() {
            Ok(mut backend) => backend.dispose(self.handle),
            Err(_) => tracing::error!(handle = ?self.handle, "culling backend busy; binding leaked"),
        }
    }
}

/// Per-observer binding held by an object.
pub struct ObserverBinding {
    observer: ObserverId,
    guard: BindingGuard,
    visible_zones: u32,
}

impl ObserverBinding {
    pub fn observer(&self) -> ObserverId {
        self.observer
    }

    pub fn handle(&self) -> BindingHandle {
        self.guard.handle
    }

    /// Whether this observer currently reports at least one zone visible.
    pub fn is_visible(&self) -> bool {
        self.visible_zones > 0
    }

    pub fn state(&self) -> BindingState {
        BindingState {
            observer: self.observer,
            visible: self.is_visible(),
        }
    }
}

impl std::fmt::Debug for ObserverBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverBinding")
            .field("observer", &self.observer)
            .field("handle", &self.guard.handle)
            .field("visible_zones", &self.visible_zones)
            .finish()
    }
}

/// Snapshot of a binding used for nearest-observer selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingState {
    pub observer: ObserverId,
    pub visible: bool,
}

/// Tracks, per zone, how many observers see it and which zone is nearest.
///
/// # Invariants
/// - `counts[i]` never goes below zero, whatever the event order.
/// - `nearest_zone()` is always the smallest `i` with `counts[i] > 0`.
/// - Bindings are fully replaced on every rebuild, never patched.
/// - All bindings of one rebuild share a single sphere buffer.
#[derive(Default)]
pub struct VisibilityAggregator {
    bindings: Vec<ObserverBinding>,
    spheres: SphereBuffer,
    counts: Vec<u32>,
    nearest: Option<usize>,
    events: Option<Receiver<VisibilityEvent>>,
}

impl std::fmt::Debug for VisibilityAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityAggregator")
            .field("bindings", &self.bindings)
            .field("counts", &self.counts)
            .field("nearest", &self.nearest)
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl VisibilityAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispose every binding and create one per observer, each watching `spheres`.
    ///
    /// Counts reset to zero and the nearest zone to none. Events still queued
    /// from the previous bindings are discarded.
    pub fn rebuild(
        &mut self,
        spheres: &[BoundingSphere],
        observers: &[Observer],
        culling: &SharedCulling,
    ) {
        self.release();

        let buffer = SphereBuffer::new(spheres.to_vec());
        let (tx, rx) = mpsc::channel();
        {
            let mut backend = culling.borrow_mut();
            for (index, observer) in observers.iter().enumerate() {
                let handle = backend.create_binding(observer.id);
                backend.set_spheres(handle, buffer.clone());
                backend.subscribe(handle, VisibilitySink::new(index, tx.clone()));
                self.bindings.push(ObserverBinding {
                    observer: observer.id,
                    guard: BindingGuard {
                        handle,
                        culling: Rc::clone(culling),
                    },
                    visible_zones: 0,
                });
            }
        }

        self.spheres = buffer;
        self.counts = vec![0; spheres.len()];
        self.nearest = None;
        self.events = Some(rx);

        tracing::debug!(
            bindings = self.bindings.len(),
            zones = spheres.len(),
            "visibility bindings rebuilt"
        );
    }

    /// Dispose all bindings and return to the unbound state.
    pub fn release(&mut self) {
        // Dropping the guards disposes the backend bindings.
        self.bindings.clear();
        self.spheres = SphereBuffer::default();
        self.events = None;
        self.counts.iter_mut().for_each(|c| *c = 0);
        self.nearest = None;
    }

    /// Apply one visibility transition and rescan for the nearest zone.
    pub fn on_visibility_event(&mut self, binding: usize, zone: usize, visible: bool) {
        let Some(count) = self.counts.get_mut(zone) else {
            tracing::warn!(binding, zone, "visibility event for unknown zone");
            return;
        };
        if visible {
            *count += 1;
        } else {
            *count = count.saturating_sub(1);
        }

        if let Some(b) = self.bindings.get_mut(binding) {
            if visible {
                b.visible_zones += 1;
            } else {
                b.visible_zones = b.visible_zones.saturating_sub(1);
            }
        }

        self.nearest = self.counts.iter().position(|&c| c > 0);
        tracing::trace!(binding, zone, visible, nearest = ?self.nearest, "visibility event applied");
    }

    /// Apply every queued event. Returns how many were applied.
    pub fn drain_events(&mut self) -> usize {
        let Some(rx) = self.events.take() else {
            return 0;
        };
        let mut applied = 0;
        while let Ok(event) = rx.try_recv() {
            self.on_visibility_event(event.binding, event.zone, event.visible);
            applied += 1;
        }
        self.events = Some(rx);
        applied
    }

    /// Move every zone sphere to `center`. One write, seen by all bindings.
    pub fn update_position(&self, center: Vec3) {
        self.spheres.move_to(center);
    }

    /// Overwrite the shared spheres, e.g. after radii changed.
    pub fn replace_spheres(&self, spheres: &[BoundingSphere]) {
        self.spheres.replace(spheres);
    }

    pub fn spheres(&self) -> &SphereBuffer {
        &self.spheres
    }

    pub fn is_bound(&self) -> bool {
        self.events.is_some()
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn nearest_zone(&self) -> Option<usize> {
        self.nearest
    }

    pub fn bindings(&self) -> &[ObserverBinding] {
        &self.bindings
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn binding_states(&self) -> impl ExactSizeIterator<Item = BindingState> + '_ {
        self.bindings.iter().map(ObserverBinding::state)
    }

    /// Size the count table without binding, for driving events by hand.
    pub fn with_zone_count(zone_count: usize) -> Self {
        Self {
            counts: vec![0; zone_count],
            ..Self::default()
        }
    }
}
