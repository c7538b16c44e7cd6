use std::collections::BTreeMap;

use sightline_common::ObserverId;
use sightline_registry::ObserverRegistry;

use crate::backend::{BindingHandle, CullingBackend, SphereBuffer, VisibilitySink};

#[derive(Debug)]
struct Binding {
    observer: ObserverId,
    spheres: SphereBuffer,
    visible: Vec<bool>,
    sink: Option<VisibilitySink>,
}

/// Culling backend that tests every sphere against its observer's view
/// volume once per update.
///
/// Bindings live in a `BTreeMap` so evaluation order follows handle order.
#[derive(Debug, Default)]
pub struct DistanceCulling {
    bindings: BTreeMap<BindingHandle, Binding>,
    next_handle: u64,
}

impl DistanceCulling {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last evaluated visibility of each sphere in a binding.
    pub fn visibility(&self, handle: BindingHandle) -> Option<&[bool]> {
        self.bindings.get(&handle).map(|b| b.visible.as_slice())
    }
}

impl CullingBackend for DistanceCulling {
    fn create_binding(&mut self, observer: ObserverId) -> BindingHandle {
        let handle = BindingHandle(self.next_handle);
        self.next_handle += 1;
        self.bindings.insert(
            handle,
            Binding {
                observer,
                spheres: SphereBuffer::default(),
                visible: Vec::new(),
                sink: None,
            },
        );
        tracing::trace!(?handle, ?observer, "binding created");
        handle
    }

    fn set_spheres(&mut self, handle: BindingHandle, spheres: SphereBuffer) {
        let Some(binding) = self.bindings.get_mut(&handle) else {
            tracing::warn!(?handle, "set_spheres on unknown binding");
            return;
        };
        if binding.visible.len() != spheres.len() {
            binding.visible = vec![false; spheres.len()];
        }
        binding.spheres = spheres;
    }

    fn subscribe(&mut self, handle: BindingHandle, sink: VisibilitySink) {
        match self.bindings.get_mut(&handle) {
            Some(binding) => binding.sink = Some(sink),
            None => tracing::warn!(?handle, "subscribe on unknown binding"),
        }
    }

    fn dispose(&mut self, handle: BindingHandle) {
        if self.bindings.remove(&handle).is_some() {
            tracing::trace!(?handle, "binding disposed");
        }
    }

    fn update(&mut self, observers: &ObserverRegistry) {
        let _span = tracing::trace_span!("culling_update").entered();
        let mut emitted = 0usize;

        for binding in self.bindings.values_mut() {
            let Some(observer) = observers.get(binding.observer) else {
                continue;
            };
            let spheres = binding.spheres.spheres();
            if binding.visible.len() != spheres.len() {
                binding.visible = vec![false; spheres.len()];
            }
            for (zone, sphere) in spheres.iter().enumerate() {
                let now = observer.sees(sphere);
                if now == binding.visible[zone] {
                    continue;
                }
                binding.visible[zone] = now;
                if let Some(sink) = &binding.sink {
                    sink.emit(zone, now);
                    emitted += 1;
                }
            }
        }

        tracing::trace!(bindings = self.bindings.len(), emitted, "culling update complete");
    }

    fn binding_count(&self) -> usize {
        self.bindings.len()
    }
}
