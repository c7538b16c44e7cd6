use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use sightline_common::{ObjectId, ObserverId, Transform};
use sightline_culling::SharedCulling;
use sightline_registry::{Observer, ObserverRegistry, RegistryChange, ViewVolume};

use crate::behavior::{Frame, LodBehavior};
use crate::config::LodConfig;
use crate::dispatch::{LodSignal, LodState};
use crate::object::LodObject;

/// Errors from [`LodSystem`] operations.
#[derive(Debug, thiserror::Error)]
pub enum LodError {
    #[error("no observer registry configured")]
    NotConfigured,
    #[error("object {0:?} not found")]
    ObjectNotFound(ObjectId),
}

/// Per-tick statistics for instrumentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LodStats {
    pub frame: u64,
    pub objects: usize,
    pub visible: usize,
    pub invisible: usize,
    pub unbound: usize,
    pub events_applied: usize,
    pub tick_time: Duration,
}

/// Owns the observer registry, the culling backend and every managed object.
///
/// Registry changes go through this type and are broadcast synchronously:
/// when `add_observer` or `remove_observer` returns, every object has
/// rebuilt its bindings against the new observer set.
pub struct LodSystem {
    config: LodConfig,
    registry: Option<ObserverRegistry>,
    culling: SharedCulling,
    objects: BTreeMap<ObjectId, LodObject>,
    frame: u64,
    stats: LodStats,
}

impl std::fmt::Debug for LodSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LodSystem")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("objects", &self.objects.len())
            .field("frame", &self.frame)
            .finish()
    }
}

impl LodSystem {
    /// Create a system with no registry. Objects stay unbound until
    /// [`configure`](Self::configure) is called.
    pub fn new(config: LodConfig, culling: SharedCulling) -> Self {
        Self {
            config,
            registry: None,
            culling,
            objects: BTreeMap::new(),
            frame: 0,
            stats: LodStats::default(),
        }
    }

    pub fn with_registry(
        config: LodConfig,
        culling: SharedCulling,
        registry: ObserverRegistry,
    ) -> Self {
        let mut system = Self::new(config, culling);
        system.configure(registry);
        system
    }

    /// Install (or replace) the observer registry and rebind every object.
    pub fn configure(&mut self, registry: ObserverRegistry) {
        tracing::debug!(observers = registry.len(), "observer registry configured");
        self.registry = Some(registry);
        self.rebind_all();
    }

    pub fn config(&self) -> &LodConfig {
        &self.config
    }

    pub fn registry(&self) -> Option<&ObserverRegistry> {
        self.registry.as_ref()
    }

    pub fn culling(&self) -> &SharedCulling {
        &self.culling
    }

    /// Frames ticked so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn stats(&self) -> &LodStats {
        &self.stats
    }

    // --- Observers ---

    pub fn add_observer(
        &mut self,
        transform: Transform,
        view: ViewVolume,
    ) -> Result<ObserverId, LodError> {
        let registry = self.registry.as_mut().ok_or(LodError::NotConfigured)?;
        let (id, change) = registry.add(transform, view);
        self.broadcast(change);
        Ok(id)
    }

    /// Remove an observer. `Ok(None)` if it was not registered.
    pub fn remove_observer(&mut self, id: ObserverId) -> Result<Option<Observer>, LodError> {
        let registry = self.registry.as_mut().ok_or(LodError::NotConfigured)?;
        let Some((observer, change)) = registry.remove(id) else {
            return Ok(None);
        };
        self.broadcast(change);
        Ok(Some(observer))
    }

    /// Move an observer. Returns false if it is not registered.
    pub fn move_observer(&mut self, id: ObserverId, transform: Transform) -> Result<bool, LodError> {
        let registry = self.registry.as_mut().ok_or(LodError::NotConfigured)?;
        Ok(registry.set_transform(id, transform))
    }

    // --- Objects ---

    /// Activate a managed object. It is bound immediately when a registry exists.
    pub fn spawn(&mut self, transform: Transform, behavior: Box<dyn LodBehavior>) -> ObjectId {
        let mut object = LodObject::new(transform, behavior, &self.config);
        let id = object.id();
        if self.registry.is_some() {
            object.rebuild(self.registry.as_ref(), &self.culling);
        }
        tracing::debug!(?id, zones = object.zones().len(), "object spawned");
        self.objects.insert(id, object);
        id
    }

    /// Deactivate an object, releasing its bindings before returning.
    pub fn despawn(&mut self, id: ObjectId) -> Result<(), LodError> {
        let mut object = self.objects.remove(&id).ok_or(LodError::ObjectNotFound(id))?;
        object.release();
        tracing::debug!(?id, "object despawned");
        Ok(())
    }

    pub fn set_object_transform(&mut self, id: ObjectId, transform: Transform) -> Result<(), LodError> {
        let object = self
            .objects
            .get_mut(&id)
            .ok_or(LodError::ObjectNotFound(id))?;
        object.set_transform(transform);
        Ok(())
    }

    pub fn object(&self, id: ObjectId) -> Option<&LodObject> {
        self.objects.get(&id)
    }

    /// Objects in id order.
    pub fn objects(&self) -> impl ExactSizeIterator<Item = &LodObject> {
        self.objects.values()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn signal(&self, id: ObjectId) -> Option<LodSignal> {
        self.objects.get(&id).and_then(LodObject::last_signal)
    }

    pub fn nearest_zone(&self, id: ObjectId) -> Option<usize> {
        self.objects.get(&id).and_then(LodObject::nearest_zone)
    }

    // --- Tick ---

    /// Run one frame: the culling update phase, then every object's late update.
    pub fn tick(&mut self, delta_seconds: f32) -> LodStats {
        self.frame += 1;
        let _span = tracing::info_span!("lod_tick", frame = self.frame).entered();
        let start = Instant::now();
        let frame = Frame {
            index: self.frame,
            delta_seconds,
        };

        let mut stats = LodStats {
            frame: self.frame,
            objects: self.objects.len(),
            ..LodStats::default()
        };

        match self.registry.as_ref() {
            None => stats.unbound = self.objects.len(),
            Some(registry) => {
                self.culling.borrow_mut().update(registry);
                for object in self.objects.values_mut() {
                    let update = object.late_update(&frame, registry);
                    stats.events_applied += update.events_applied;
                    match update.signal.map(|s| s.state()) {
                        Some(LodState::Visible) => stats.visible += 1,
                        Some(LodState::Invisible) => stats.invisible += 1,
                        None => stats.unbound += 1,
                    }
                }
            }
        }

        stats.tick_time = start.elapsed();
        tracing::trace!(
            visible = stats.visible,
            invisible = stats.invisible,
            unbound = stats.unbound,
            events = stats.events_applied,
            "lod tick complete"
        );
        self.stats = stats;
        stats
    }

    fn broadcast(&mut self, change: RegistryChange) {
        tracing::debug!(?change, objects = self.objects.len(), "broadcasting registry change");
        self.rebind_all();
    }

    fn rebind_all(&mut self) {
        let registry = self.registry.as_ref();
        for object in self.objects.values_mut() {
            object.rebuild(registry, &self.culling);
        }
    }
}
