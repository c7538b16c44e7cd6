use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use sightline_lod::LodBehavior;

use crate::light::{LightDimmer, LightHandle, PointLight};
use crate::toggle::{EnableToggle, Switch};

/// Serializable description of a behavior, as written in scene files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BehaviorKind {
    Animator {
        radius: f32,
    },
    Canvas {
        size: f32,
    },
    Light {
        intensity: f32,
        range: f32,
    },
    /// A light whose reference intensity comes from its controller.
    LightController {
        intensity: f32,
        range: f32,
        reference_intensity: f32,
    },
}

/// The host-side view of a built behavior's effect.
#[derive(Debug, Clone)]
pub enum EffectHandle {
    Switch(Switch),
    Light(LightHandle),
}

impl EffectHandle {
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Switch(s) => s.is_enabled(),
            Self::Light(l) => l.borrow().enabled,
        }
    }

    /// Short human-readable state for reports.
    pub fn describe(&self) -> String {
        match self {
            Self::Switch(s) => format!("enabled={}", s.is_enabled()),
            Self::Light(l) => {
                let l = l.borrow();
                format!(
                    "enabled={} intensity={:.3} range={:.3}",
                    l.enabled, l.intensity, l.range
                )
            }
        }
    }
}

impl BehaviorKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Animator { .. } => "animator",
            Self::Canvas { .. } => "canvas",
            Self::Light { .. } => "light",
            Self::LightController { .. } => "light_controller",
        }
    }

    /// Build the behavior and the handle the host keeps.
    pub fn build(&self) -> (Box<dyn LodBehavior>, EffectHandle) {
        match *self {
            Self::Animator { radius } => {
                let switch = Switch::new(false);
                let behavior = EnableToggle::animator(radius, switch.clone());
                (Box::new(behavior), EffectHandle::Switch(switch))
            }
            Self::Canvas { size } => {
                let switch = Switch::new(false);
                let behavior = EnableToggle::canvas(size, switch.clone());
                (Box::new(behavior), EffectHandle::Switch(switch))
            }
            Self::Light { intensity, range } => {
                let light = Rc::new(RefCell::new(PointLight::new(intensity, range)));
                let behavior = LightDimmer::new(Rc::clone(&light));
                (Box::new(behavior), EffectHandle::Light(light))
            }
            Self::LightController {
                intensity,
                range,
                reference_intensity,
            } => {
                let light = Rc::new(RefCell::new(PointLight::new(intensity, range)));
                let behavior =
                    LightDimmer::with_reference_intensity(Rc::clone(&light), reference_intensity);
                (Box::new(behavior), EffectHandle::Light(light))
            }
        }
    }
}
