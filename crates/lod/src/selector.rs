use glam::Vec3;
use sightline_common::ObserverId;
use sightline_registry::ObserverRegistry;

use crate::aggregator::BindingState;

/// Find the nearest observer that currently sees the object.
///
/// With exactly one binding no distance is computed: its observer is returned
/// iff it is visible. Otherwise visible bindings whose observer is still
/// registered are compared by squared distance; ties keep the earlier binding.
pub fn find_nearest_visible<I>(
    position: Vec3,
    bindings: I,
    observers: &ObserverRegistry,
) -> Option<ObserverId>
where
    I: IntoIterator<Item = BindingState>,
    I::IntoIter: ExactSizeIterator,
{
    let mut bindings = bindings.into_iter();
    if bindings.len() == 1 {
        return bindings
            .next()
            .filter(|b| b.visible)
            .map(|b| b.observer);
    }

    let mut best: Option<(ObserverId, f32)> = None;
    for binding in bindings.filter(|b| b.visible) {
        let Some(at) = observers.position(binding.observer) else {
            continue;
        };
        let dist_sq = at.distance_squared(position);
        if best.is_none_or(|(_, d)| dist_sq < d) {
            best = Some((binding.observer, dist_sq));
        }
    }
    best.map(|(id, _)| id)
}

/// Caches the nearest visible observer and refreshes it on a fixed cadence.
///
/// The cached observer may lag the true nearest one by up to `interval`
/// frames. A missing or unregistered cached observer forces a refresh.
#[derive(Debug, Clone)]
pub struct ObserverSelector {
    interval: u64,
    cached: Option<ObserverId>,
}

impl ObserverSelector {
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            cached: None,
        }
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    pub fn cached(&self) -> Option<ObserverId> {
        self.cached
    }

    pub fn clear(&mut self) {
        self.cached = None;
    }

    pub fn refresh_due(&self, frame: u64, observers: &ObserverRegistry) -> bool {
        let cache_valid = self.cached.is_some_and(|id| observers.contains(id));
        !cache_valid || frame % self.interval == 0
    }

    /// Return the cached observer, refreshing it first when due.
    pub fn select<I>(
        &mut self,
        frame: u64,
        position: Vec3,
        bindings: I,
        observers: &ObserverRegistry,
    ) -> Option<ObserverId>
    where
        I: IntoIterator<Item = BindingState>,
        I::IntoIter: ExactSizeIterator,
    {
        if self.refresh_due(frame, observers) {
            self.cached = find_nearest_visible(position, bindings, observers);
        }
        self.cached
    }
}
