use crate::proximity::DistanceRange;

/// Per-tick timing handed to behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    /// Monotonic tick counter, starting at 1 for the first tick.
    pub index: u64,
    /// Seconds elapsed since the previous tick.
    pub delta_seconds: f32,
}

/// An effect driven by the LOD signal of one object.
///
/// Implementations supply the zone radii and react to the signal. Callbacks
/// run every tick and report nothing back; failures inside them are the
/// behavior's own concern.
pub trait LodBehavior {
    /// Zone radii, nearest first. Read once when the object is created, and
    /// every tick when live radii are enabled.
    fn zone_radii(&self) -> Vec<f32>;

    /// Whether closeness is derived from observer distance. When false a
    /// fixed placeholder is passed instead.
    fn uses_distance(&self) -> bool {
        true
    }

    /// Near/far pair for this behavior; `None` uses the configured default.
    fn distance_range(&self) -> Option<DistanceRange> {
        None
    }

    /// The object is seen: `zone` is the nearest visible zone, `closeness` is in `[0, 1]`.
    fn on_visible(&mut self, zone: usize, closeness: f32, frame: &Frame);

    /// No observer sees any zone.
    fn on_invisible(&mut self, frame: &Frame);
}

impl<B: LodBehavior + ?Sized> LodBehavior for Box<B> {
    fn zone_radii(&self) -> Vec<f32> {
        (**self).zone_radii()
    }

    fn uses_distance(&self) -> bool {
        (**self).uses_distance()
    }

    fn distance_range(&self) -> Option<DistanceRange> {
        (**self).distance_range()
    }

    fn on_visible(&mut self, zone: usize, closeness: f32, frame: &Frame) {
        (**self).on_visible(zone, closeness, frame)
    }

    fn on_invisible(&mut self, frame: &Frame) {
        (**self).on_invisible(frame)
    }
}
