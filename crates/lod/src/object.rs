use sightline_common::{ObjectId, ObserverId, Transform};
use sightline_culling::SharedCulling;
use sightline_registry::ObserverRegistry;

use crate::aggregator::VisibilityAggregator;
use crate::behavior::{Frame, LodBehavior};
use crate::config::LodConfig;
use crate::dispatch::{ClosenessMode, LodDispatcher, LodSignal, resolve};
use crate::selector::ObserverSelector;
use crate::zones::ZoneSet;

/// Result of one late-update pass over an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectUpdate {
    /// Signal delivered this tick; `None` while unbound.
    pub signal: Option<LodSignal>,
    /// Visibility events applied before dispatch.
    pub events_applied: usize,
}

/// LOD state of one managed object.
///
/// Created on activation, dropped on deactivation. Dropping releases every
/// culling binding synchronously.
pub struct LodObject {
    id: ObjectId,
    transform: Transform,
    behavior: Box<dyn LodBehavior>,
    zones: ZoneSet,
    aggregator: VisibilityAggregator,
    selector: ObserverSelector,
    dispatcher: LodDispatcher,
    closeness: ClosenessMode,
    live_radii: bool,
}

impl std::fmt::Debug for LodObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LodObject")
            .field("id", &self.id)
            .field("position", &self.transform.position)
            .field("zones", &self.zones)
            .field("aggregator", &self.aggregator)
            .field("cached_observer", &self.selector.cached())
            .field("last_signal", &self.dispatcher.last())
            .finish()
    }
}

impl LodObject {
    pub fn new(transform: Transform, behavior: Box<dyn LodBehavior>, config: &LodConfig) -> Self {
        Self::with_id(ObjectId::new(), transform, behavior, config)
    }

    pub fn with_id(
        id: ObjectId,
        transform: Transform,
        behavior: Box<dyn LodBehavior>,
        config: &LodConfig,
    ) -> Self {
        let zones = ZoneSet::new(&behavior.zone_radii());
        let closeness = if behavior.uses_distance() {
            ClosenessMode::Distance(behavior.distance_range().unwrap_or(config.distance))
        } else {
            ClosenessMode::Fixed(config.fixed_closeness)
        };
        Self {
            id,
            transform,
            behavior,
            zones,
            aggregator: VisibilityAggregator::new(),
            selector: ObserverSelector::new(config.observer_refresh_interval),
            dispatcher: LodDispatcher::new(),
            closeness,
            live_radii: config.live_radii,
        }
    }

    /// Replace all bindings with one per registered observer.
    ///
    /// Without a registry this is a no-op and the object keeps its current
    /// bindings (none, if it was never bound).
    pub fn rebuild(&mut self, observers: Option<&ObserverRegistry>, culling: &SharedCulling) {
        let Some(observers) = observers else {
            tracing::warn!(id = ?self.id, "no observer registry configured; object stays unbound");
            return;
        };
        let spheres = self.zones.spheres(self.transform.position);
        self.aggregator.rebuild(&spheres, observers.observers(), culling);
        self.selector.clear();
    }

    /// Dispose all bindings now.
    pub fn release(&mut self) {
        self.aggregator.release();
        self.selector.clear();
    }

    /// Per-tick pass: apply queued events, move spheres, pick the observer,
    /// and dispatch the signal.
    pub fn late_update(&mut self, frame: &Frame, observers: &ObserverRegistry) -> ObjectUpdate {
        if !self.aggregator.is_bound() {
            return ObjectUpdate {
                signal: None,
                events_applied: 0,
            };
        }

        let events_applied = self.aggregator.drain_events();

        let position = self.transform.position;
        if self.live_radii {
            self.zones.refresh_radii(&self.behavior.zone_radii());
            self.aggregator.replace_spheres(&self.zones.spheres(position));
        } else {
            self.aggregator.update_position(position);
        }

        let observer = self.selector.select(
            frame.index,
            position,
            self.aggregator.binding_states(),
            observers,
        );
        let signal = resolve(
            self.aggregator.nearest_zone(),
            observer.and_then(|id| observers.position(id)),
            position,
            self.closeness,
        );
        self.dispatcher.dispatch(signal, self.behavior.as_mut(), frame);

        ObjectUpdate {
            signal: Some(signal),
            events_applied,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Host transform; read on the next late update.
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn zones(&self) -> &ZoneSet {
        &self.zones
    }

    pub fn aggregator(&self) -> &VisibilityAggregator {
        &self.aggregator
    }

    pub fn nearest_zone(&self) -> Option<usize> {
        self.aggregator.nearest_zone()
    }

    pub fn is_bound(&self) -> bool {
        self.aggregator.is_bound()
    }

    pub fn binding_count(&self) -> usize {
        self.aggregator.binding_count()
    }

    pub fn cached_observer(&self) -> Option<ObserverId> {
        self.selector.cached()
    }

    pub fn last_signal(&self) -> Option<LodSignal> {
        self.dispatcher.last()
    }

    pub fn closeness_mode(&self) -> ClosenessMode {
        self.closeness
    }

    pub fn behavior(&self) -> &dyn LodBehavior {
        self.behavior.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::testing::RecordingCulling;
    use crate::proximity::DistanceRange;
    use glam::Vec3;
    use sightline_culling::{DistanceCulling, shared};
    use sightline_registry::ViewVolume;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Behavior that logs every callback into a shared vector.
    struct Probe {
        radii: Rc<RefCell<Vec<f32>>>,
        distance: bool,
        calls: Rc<RefCell<Vec<LodSignal>>>,
    }

    impl LodBehavior for Probe {
        fn zone_radii(&self) -> Vec<f32> {
            self.radii.borrow().clone()
        }

        fn uses_distance(&self) -> bool {
            self.distance
        }

        fn on_visible(&mut self, zone: usize, closeness: f32, _frame: &Frame) {
            self.calls
                .borrow_mut()
                .push(LodSignal::Visible { zone, closeness });
        }

        fn on_invisible(&mut self, _frame: &Frame) {
            self.calls.borrow_mut().push(LodSignal::Invisible);
        }
    }

    type Calls = Rc<RefCell<Vec<LodSignal>>>;

    fn probe(radii: &[f32], distance: bool) -> (Box<dyn LodBehavior>, Calls, Rc<RefCell<Vec<f32>>>) {
        let calls: Calls = Rc::default();
        let radii = Rc::new(RefCell::new(radii.to_vec()));
        let behavior = Probe {
            radii: radii.clone(),
            distance,
            calls: calls.clone(),
        };
        (Box::new(behavior), calls, radii)
    }

    fn frame(index: u64) -> Frame {
        Frame {
            index,
            delta_seconds: 1.0 / 60.0,
        }
    }

    fn config() -> LodConfig {
        LodConfig {
            live_radii: false,
            ..LodConfig::default()
        }
    }

    #[test]
    fn unbound_object_dispatches_nothing() {
        let (behavior, calls, _) = probe(&[1.0], true);
        let culling = shared(DistanceCulling::new());
        let mut object = LodObject::new(Transform::default(), behavior, &config());

        object.rebuild(None, &culling);
        let update = object.late_update(&frame(1), &ObserverRegistry::new());
        assert_eq!(update.signal, None);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn visible_signal_carries_zone_and_closeness() {
        let (behavior, calls, _) = probe(&[3.0, 6.0, 9.0], true);
        let mut registry = ObserverRegistry::new();
        registry.add(
            Transform::at(Vec3::new(0.0, 0.0, 12.5)),
            ViewVolume::sphere(4.0),
        );
        let culling = shared(DistanceCulling::new());

        let mut object = LodObject::new(Transform::default(), behavior, &config());
        object.rebuild(Some(&registry), &culling);

        // Engine phase, then late update.
        culling.borrow_mut().update(&registry);
        let update = object.late_update(&frame(1), &registry);

        // 12.5 - 9 <= 4 sees zone 2 only; 12.5 - 6 > 4.
        assert_eq!(update.events_applied, 1);
        assert_eq!(
            update.signal,
            Some(LodSignal::Visible {
                zone: 2,
                closeness: 0.5
            })
        );
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn fixed_closeness_for_distance_insensitive_behavior() {
        let (behavior, _, _) = probe(&[5.0], false);
        let mut registry = ObserverRegistry::new();
        registry.add(Transform::at(Vec3::new(0.0, 0.0, 3.0)), ViewVolume::sphere(1.0));
        let culling = shared(DistanceCulling::new());
        let config = LodConfig {
            fixed_closeness: 0.75,
            ..config()
        };

        let mut object = LodObject::new(Transform::default(), behavior, &config);
        assert_eq!(object.closeness_mode(), ClosenessMode::Fixed(0.75));
        object.rebuild(Some(&registry), &culling);
        culling.borrow_mut().update(&registry);
        assert_eq!(
            object.late_update(&frame(1), &registry).signal,
            Some(LodSignal::Visible {
                zone: 0,
                closeness: 0.75
            })
        );
    }

    #[test]
    fn behavior_distance_range_overrides_config() {
        struct Ranged;
        impl LodBehavior for Ranged {
            fn zone_radii(&self) -> Vec<f32> {
                vec![1.0]
            }
            fn distance_range(&self) -> Option<DistanceRange> {
                Some(DistanceRange::new(1.0, 2.0))
            }
            fn on_visible(&mut self, _: usize, _: f32, _: &Frame) {}
            fn on_invisible(&mut self, _: &Frame) {}
        }

        let object = LodObject::new(Transform::default(), Box::new(Ranged), &config());
        assert_eq!(
            object.closeness_mode(),
            ClosenessMode::Distance(DistanceRange::new(1.0, 2.0))
        );
    }

    #[test]
    fn moving_object_updates_spheres_and_signal() {
        let (behavior, _, _) = probe(&[2.0], true);
        let mut registry = ObserverRegistry::new();
        registry.add(Transform::default(), ViewVolume::sphere(5.0));
        let culling = shared(DistanceCulling::new());

        let mut object = LodObject::new(Transform::at(Vec3::new(0.0, 0.0, -4.0)), behavior, &config());
        object.rebuild(Some(&registry), &culling);
        culling.borrow_mut().update(&registry);
        assert!(matches!(
            object.late_update(&frame(1), &registry).signal,
            Some(LodSignal::Visible { .. })
        ));

        object.set_transform(Transform::at(Vec3::new(0.0, 0.0, -40.0)));
        // Late update pushes the new center; the next engine phase sees it.
        object.late_update(&frame(2), &registry);
        culling.borrow_mut().update(&registry);
        assert_eq!(
            object.late_update(&frame(3), &registry).signal,
            Some(LodSignal::Invisible)
        );
    }

    #[test]
    fn unordered_radii_report_outer_sphere_as_zone_zero() {
        // Observer 10 away with reach 2 sees only the 9-radius sphere.
        let mut registry = ObserverRegistry::new();
        registry.add(Transform::at(Vec3::new(10.0, 0.0, 0.0)), ViewVolume::sphere(2.0));

        let nearest_for = |radii: &[f32]| {
            let (behavior, _, _) = probe(radii, true);
            let culling = shared(DistanceCulling::new());
            let mut object = LodObject::new(Transform::default(), behavior, &config());
            object.rebuild(Some(&registry), &culling);
            culling.borrow_mut().update(&registry);
            object.late_update(&frame(1), &registry);
            object.nearest_zone()
        };

        assert_eq!(nearest_for(&[3.0, 9.0]), Some(1));
        // Same spheres, reversed order: the outer shell now claims index 0.
        assert_eq!(nearest_for(&[9.0, 3.0]), Some(0));
    }

    #[test]
    fn live_radii_follow_behavior() {
        let (behavior, _, radii) = probe(&[1.0, 2.0], true);
        let mut registry = ObserverRegistry::new();
        registry.add(Transform::default(), ViewVolume::default());
        let mock = RecordingCulling::shared();
        let culling: SharedCulling = mock.clone();
        let config = LodConfig {
            live_radii: true,
            ..LodConfig::default()
        };

        let mut object = LodObject::new(Transform::default(), behavior, &config);
        object.rebuild(Some(&registry), &culling);
        *radii.borrow_mut() = vec![4.0, 8.0];
        object.late_update(&frame(1), &registry);

        let handle = mock.borrow().live()[0];
        let spheres: Vec<f32> = mock
            .borrow()
            .last_spheres(handle)
            .unwrap()
            .iter()
            .map(|s| s.radius)
            .collect();
        assert_eq!(spheres, vec![4.0, 8.0]);
    }

    #[test]
    fn ticks_move_spheres_without_resending() {
        let (behavior, _, _) = probe(&[1.0, 3.0], true);
        let mut registry = ObserverRegistry::new();
        registry.add(Transform::default(), ViewVolume::default());
        registry.add(Transform::default(), ViewVolume::default());
        let mock = RecordingCulling::shared();
        let culling: SharedCulling = mock.clone();

        let mut object = LodObject::new(Transform::default(), behavior, &config());
        object.rebuild(Some(&registry), &culling);
        for i in 1..=5 {
            object.set_transform(Transform::at(Vec3::new(i as f32, 0.0, 0.0)));
            object.late_update(&frame(i), &registry);
        }

        let m = mock.borrow();
        assert_eq!(m.spheres.len(), 2);
        for handle in m.live() {
            let seen = m.last_spheres(handle).unwrap();
            assert!(seen.iter().all(|s| s.center == Vec3::new(5.0, 0.0, 0.0)));
        }
    }

    #[test]
    fn drop_disposes_every_binding_once() {
        let (behavior, calls, _) = probe(&[1.0], true);
        let mut registry = ObserverRegistry::new();
        registry.add(Transform::default(), ViewVolume::default());
        registry.add(Transform::default(), ViewVolume::default());
        let mock = RecordingCulling::shared();
        let culling: SharedCulling = mock.clone();

        let mut object = LodObject::new(Transform::default(), behavior, &config());
        object.rebuild(Some(&registry), &culling);
        let handles = mock.borrow().live();
        assert_eq!(handles.len(), 2);
        drop(object);

        let m = mock.borrow();
        assert_eq!(m.disposed.len(), 2);
        for h in &handles {
            assert_eq!(m.disposed.iter().filter(|d| *d == h).count(), 1);
            // A disposed binding can no longer deliver events.
            assert!(!m.fire(*h, 0, true));
        }
        assert!(calls.borrow().is_empty());
    }
}
