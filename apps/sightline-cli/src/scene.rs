//! Scene files for the `simulate` command.

use std::path::Path;

use anyhow::Context;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use sightline_behaviors::BehaviorKind;
use sightline_common::Transform;
use sightline_registry::ViewVolume;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverEntry {
    pub name: String,
    pub position: Vec3,
    /// Displacement applied before every tick.
    #[serde(default)]
    pub velocity: Vec3,
    #[serde(default)]
    pub view: ViewVolume,
    /// Point the observer keeps facing. Without it the observer faces -Z.
    #[serde(default)]
    pub look_at: Option<Vec3>,
}

impl ObserverEntry {
    /// Transform for the observer standing at `position`.
    pub fn transform_at(&self, position: Vec3) -> Transform {
        let direction = self
            .look_at
            .map_or(Vec3::ZERO, |target| (target - position).normalize_or_zero());
        let rotation = if direction == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_rotation_arc(Vec3::NEG_Z, direction)
        };
        Transform {
            position,
            rotation,
            ..Transform::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub name: String,
    pub position: Vec3,
    pub behavior: BehaviorKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub observers: Vec<ObserverEntry>,
    #[serde(default)]
    pub objects: Vec<ObjectEntry>,
}

impl Scene {
    pub fn from_yaml_str(s: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(s).context("parsing scene YAML")
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading scene {}", path.display()))?;
        Self::from_yaml_str(&data)
    }
}
