use std::cell::Cell;
use std::rc::Rc;

use sightline_lod::{Frame, LodBehavior};

/// Shared on/off flag for an effect the host owns.
#[derive(Debug, Clone, Default)]
pub struct Switch(Rc<Cell<bool>>);

impl Switch {
    pub fn new(enabled: bool) -> Self {
        Self(Rc::new(Cell::new(enabled)))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.get()
    }

    /// Returns true if the state changed.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        self.0.replace(enabled) != enabled
    }
}

/// What an [`EnableToggle`] switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleTarget {
    Animator,
    Canvas,
}

/// One zone; enables the target while any observer sees it.
///
/// Closeness is ignored, so the object uses the fixed placeholder.
#[derive(Debug, Clone)]
pub struct EnableToggle {
    target: ToggleTarget,
    radius: f32,
    switch: Switch,
}

impl EnableToggle {
    pub fn animator(radius: f32, switch: Switch) -> Self {
        Self {
            target: ToggleTarget::Animator,
            radius,
            switch,
        }
    }

    /// A canvas of the given size; the size is used as the zone radius.
    pub fn canvas(size: f32, switch: Switch) -> Self {
        Self {
            target: ToggleTarget::Canvas,
            radius: size,
            switch,
        }
    }

    pub fn target(&self) -> ToggleTarget {
        self.target
    }

    pub fn switch(&self) -> &Switch {
        &self.switch
    }
}

impl LodBehavior for EnableToggle {
    fn zone_radii(&self) -> Vec<f32> {
        vec![self.radius]
    }

    fn uses_distance(&self) -> bool {
        false
    }

    fn on_visible(&mut self, zone: usize, _closeness: f32, frame: &Frame) {
        if self.switch.set_enabled(true) {
            tracing::debug!(target_kind = ?self.target, zone, frame = frame.index, "effect enabled");
        }
    }

    fn on_invisible(&mut self, frame: &Frame) {
        if self.switch.set_enabled(false) {
            tracing::debug!(target_kind = ?self.target, frame = frame.index, "effect disabled");
        }
    }
}
