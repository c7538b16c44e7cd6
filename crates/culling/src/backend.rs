use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::mpsc::Sender;

use glam::Vec3;
use sightline_common::{BoundingSphere, ObserverId};
use sightline_registry::ObserverRegistry;

/// Opaque handle to one (object, observer) binding inside a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingHandle(pub u64);

/// A visibility transition for one sphere of one binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityEvent {
    /// Index of the binding inside the subscriber's binding list.
    pub binding: usize,
    /// Index of the sphere as passed to `set_spheres`.
    pub zone: usize,
    pub visible: bool,
}

/// Delivery endpoint for a binding's events.
///
/// The binding index is fixed at subscription time and stamped on every
/// event, so one channel can serve all of an object's bindings.
#[derive(Debug, Clone)]
pub struct VisibilitySink {
    binding: usize,
    tx: Sender<VisibilityEvent>,
}

impl VisibilitySink {
    pub fn new(binding: usize, tx: Sender<VisibilityEvent>) -> Self {
        Self { binding, tx }
    }

    pub fn binding(&self) -> usize {
        self.binding
    }

    /// Deliver a transition. Returns false if the receiving side is gone.
    pub fn emit(&self, zone: usize, visible: bool) -> bool {
        self.tx
            .send(VisibilityEvent {
                binding: self.binding,
                zone,
                visible,
            })
            .is_ok()
    }
}

/// Ordered zone spheres shared by every binding of one object.
///
/// Backends keep a clone and read it during `update`, so moving an object
/// is one in-place write regardless of how many observers watch it.
#[derive(Debug, Clone, Default)]
pub struct SphereBuffer(Rc<RefCell<Vec<BoundingSphere>>>);

impl SphereBuffer {
    pub fn new(spheres: Vec<BoundingSphere>) -> Self {
        Self(Rc::new(RefCell::new(spheres)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn spheres(&self) -> Ref<'_, [BoundingSphere]> {
        Ref::map(self.0.borrow(), Vec::as_slice)
    }

    pub fn to_vec(&self) -> Vec<BoundingSphere> {
        self.0.borrow().clone()
    }

    /// Overwrite the contents, reusing the allocation.
    pub fn replace(&self, spheres: &[BoundingSphere]) {
        let mut buf = self.0.borrow_mut();
        buf.clear();
        buf.extend_from_slice(spheres);
    }

    /// Move every sphere's center to `center`.
    pub fn move_to(&self, center: Vec3) {
        for sphere in self.0.borrow_mut().iter_mut() {
            sphere.center = center;
        }
    }

    /// Whether both handles point at the same storage.
    pub fn shares_with(&self, other: &SphereBuffer) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// The spatial culling service consumed by the LOD core.
///
/// Mirrors the lifecycle of an engine culling group: a binding targets one
/// observer, is given a fixed ordered set of spheres, reports per-sphere
/// transitions to its subscriber, and is disposed explicitly.
pub trait CullingBackend {
    /// Create a binding that evaluates spheres against `observer`.
    fn create_binding(&mut self, observer: ObserverId) -> BindingHandle;

    /// Attach the object's sphere buffer. Ordering defines zone indices.
    /// Later writes to the buffer are picked up on the next `update`.
    fn set_spheres(&mut self, handle: BindingHandle, spheres: SphereBuffer);

    /// Route the binding's transitions to `sink`.
    fn subscribe(&mut self, handle: BindingHandle, sink: VisibilitySink);

    /// Release the binding. Safe on a handle with no pending events.
    fn dispose(&mut self, handle: BindingHandle);

    /// Engine-driven update phase: evaluate bindings and emit transitions.
    fn update(&mut self, observers: &ObserverRegistry);

    /// Number of live bindings.
    fn binding_count(&self) -> usize;
}

/// Backend shared between the system and every binding guard.
pub type SharedCulling = Rc<RefCell<dyn CullingBackend>>;

/// Wrap a backend for sharing.
pub fn shared<B: CullingBackend + 'static>(backend: B) -> SharedCulling {
    Rc::new(RefCell::new(backend))
}
