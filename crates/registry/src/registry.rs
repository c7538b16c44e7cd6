use glam::Vec3;
use sightline_common::{ObserverId, Transform};

use crate::observer::{Observer, ViewVolume};

/// A structural change to the registry. Every managed object must rebuild its
/// bindings when one of these is broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryChange {
    Added { id: ObserverId, generation: u64 },
    Removed { id: ObserverId, generation: u64 },
}

impl RegistryChange {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Added { generation, .. } | Self::Removed { generation, .. } => *generation,
        }
    }
}

/// Flat, ordered collection of observers.
///
/// Registration order is significant: bindings are created in this order,
/// and ties in nearest-observer selection resolve to the earlier observer.
#[derive(Debug, Clone, Default)]
pub struct ObserverRegistry {
    observers: Vec<Observer>,
    generation: u64,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Monotonic counter bumped on every add/remove.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Observers in registration order.
    pub fn observers(&self) -> &[Observer] {
        &self.observers
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Observer> {
        self.observers.iter()
    }

    pub fn get(&self, id: ObserverId) -> Option<&Observer> {
        self.observers.iter().find(|o| o.id == id)
    }

    pub fn contains(&self, id: ObserverId) -> bool {
        self.get(id).is_some()
    }

    /// World position of an observer, if it is still registered.
    pub fn position(&self, id: ObserverId) -> Option<Vec3> {
        self.get(id).map(Observer::position)
    }

    /// Register a new observer. Returns its id and the change to broadcast.
    pub fn add(&mut self, transform: Transform, view: ViewVolume) -> (ObserverId, RegistryChange) {
        let observer = Observer::new(transform, view);
        let id = observer.id;
        let change = self.insert(observer);
        (id, change)
    }

    /// Register an observer with a caller-chosen id.
    ///
    /// An id that is already present is registered again, producing a second
    /// binding for the same viewpoint.
    pub fn insert(&mut self, observer: Observer) -> RegistryChange {
        let id = observer.id;
        if self.contains(id) {
            tracing::warn!(?id, "observer registered twice");
        }
        self.observers.push(observer);
        self.generation += 1;
        tracing::debug!(?id, count = self.observers.len(), "observer added");
        RegistryChange::Added {
            id,
            generation: self.generation,
        }
    }

    /// Remove the first registration of `id`.
    pub fn remove(&mut self, id: ObserverId) -> Option<(Observer, RegistryChange)> {
        let index = self.observers.iter().position(|o| o.id == id)?;
        let observer = self.observers.remove(index);
        self.generation += 1;
        tracing::debug!(?id, count = self.observers.len(), "observer removed");
        Some((
            observer,
            RegistryChange::Removed {
                id,
                generation: self.generation,
            },
        ))
    }

    /// Move an observer. Returns false if it is not registered.
    pub fn set_transform(&mut self, id: ObserverId, transform: Transform) -> bool {
        let mut found = false;
        for observer in self.observers.iter_mut().filter(|o| o.id == id) {
            observer.transform = transform;
            found = true;
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_starts_empty() {
        let r = ObserverRegistry::new();
        assert!(r.is_empty());
        assert_eq!(r.generation(), 0);
    }

    #[test]
    fn add_and_remove_bump_generation() {
        let mut r = ObserverRegistry::new();
        let (a, change) = r.add(Transform::default(), ViewVolume::default());
        assert_eq!(change, RegistryChange::Added { id: a, generation: 1 });
        let (b, _) = r.add(Transform::default(), ViewVolume::default());
        assert_eq!(r.len(), 2);

        let (removed, change) = r.remove(a).unwrap();
        assert_eq!(removed.id, a);
        assert_eq!(change.generation(), 3);
        assert_eq!(r.observers()[0].id, b);
    }

    #[test]
    fn remove_unknown_is_none_and_keeps_generation() {
        let mut r = ObserverRegistry::new();
        r.add(Transform::default(), ViewVolume::default());
        assert!(r.remove(ObserverId::new()).is_none());
        assert_eq!(r.generation(), 1);
    }

    #[test]
    fn registration_order_is_preserved() {
        let mut r = ObserverRegistry::new();
        let ids: Vec<ObserverId> = (0..5)
            .map(|i| {
                r.add(Transform::at(Vec3::splat(i as f32)), ViewVolume::default())
                    .0
            })
            .collect();
        let stored: Vec<ObserverId> = r.iter().map(|o| o.id).collect();
        assert_eq!(stored, ids);
    }

    #[test]
    fn moving_is_not_a_change() {
        let mut r = ObserverRegistry::new();
        let (id, _) = r.add(Transform::default(), ViewVolume::default());
        assert!(r.set_transform(id, Transform::at(Vec3::new(1.0, 2.0, 3.0))));
        assert_eq!(r.position(id), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(r.generation(), 1);
        assert!(!r.set_transform(ObserverId::new(), Transform::default()));
    }

    #[test]
    fn duplicate_insert_registers_twice() {
        let mut r = ObserverRegistry::new();
        let observer = Observer::new(Transform::default(), ViewVolume::default());
        r.insert(observer.clone());
        r.insert(observer.clone());
        assert_eq!(r.len(), 2);
        r.remove(observer.id);
        assert!(r.contains(observer.id));
    }
}
