use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use sightline_lod::{Frame, LodBehavior};

/// Host-side light state the dimmer writes to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub intensity: f32,
    pub range: f32,
    pub enabled: bool,
}

impl PointLight {
    pub fn new(intensity: f32, range: f32) -> Self {
        Self {
            intensity,
            range,
            enabled: true,
        }
    }
}

pub type LightHandle = Rc<RefCell<PointLight>>;

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Three zones at a third, two thirds and the full light range. Nearer
/// zones and closer observers push intensity and range toward their
/// reference values.
#[derive(Debug, Clone)]
pub struct LightDimmer {
    light: LightHandle,
    reference_intensity: f32,
    initial_range: f32,
}

impl LightDimmer {
    /// Capture the light's current intensity and range as references.
    pub fn new(light: LightHandle) -> Self {
        let (intensity, range) = {
            let l = light.borrow();
            (l.intensity, l.range)
        };
        Self {
            light,
            reference_intensity: intensity,
            initial_range: range,
        }
    }

    /// Reference intensity supplied by a controller rather than read from the light.
    pub fn with_reference_intensity(light: LightHandle, intensity: f32) -> Self {
        let range = light.borrow().range;
        Self {
            light,
            reference_intensity: intensity,
            initial_range: range,
        }
    }

    pub fn light(&self) -> &LightHandle {
        &self.light
    }

    pub fn reference_intensity(&self) -> f32 {
        self.reference_intensity
    }

    pub fn initial_range(&self) -> f32 {
        self.initial_range
    }

    /// Fraction of the reference the light should approach for this zone.
    pub fn target_fraction(&self, zone: usize, closeness: f32) -> f32 {
        let count = self.zone_radii().len() as f32;
        ((count - zone as f32) / count) * closeness
    }
}

impl LodBehavior for LightDimmer {
    fn zone_radii(&self) -> Vec<f32> {
        vec![
            self.initial_range / 3.0,
            self.initial_range / 1.5,
            self.initial_range,
        ]
    }

    fn on_visible(&mut self, zone: usize, closeness: f32, frame: &Frame) {
        let pct = self.target_fraction(zone, closeness);
        let t = frame.delta_seconds.clamp(0.0, 1.0);
        let mut light = self.light.borrow_mut();
        light.intensity = lerp(light.intensity, pct * self.reference_intensity, t);
        light.range = lerp(light.range, pct * self.initial_range, t);
        if !light.enabled {
            tracing::debug!(zone, closeness, frame = frame.index, "light enabled");
        }
        light.enabled = true;
        tracing::trace!(intensity = light.intensity, range = light.range, pct, "light dimmed");
    }

    fn on_invisible(&mut self, frame: &Frame) {
        let mut light = self.light.borrow_mut();
        if light.enabled {
            tracing::debug!(frame = frame.index, "light disabled");
        }
        light.enabled = false;
    }
}
