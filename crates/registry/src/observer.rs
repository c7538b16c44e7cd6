use glam::Vec3;
use serde::{Deserialize, Serialize};
use sightline_common::{BoundingSphere, ObserverId, Transform};

/// The region of space an observer can see.
///
/// `reach` bounds how far the observer sees. `half_angle` (radians), when
/// set, narrows the volume to a cone around the observer's forward axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewVolume {
    pub reach: f32,
    #[serde(default)]
    pub half_angle: Option<f32>,
}

impl Default for ViewVolume {
    fn default() -> Self {
        Self {
            reach: 100.0,
            half_angle: None,
        }
    }
}

impl ViewVolume {
    /// Omnidirectional volume of the given reach.
    pub fn sphere(reach: f32) -> Self {
        Self {
            reach,
            half_angle: None,
        }
    }

    /// Cone of `half_angle` radians around the forward axis, limited by `reach`.
    pub fn cone(reach: f32, half_angle: f32) -> Self {
        Self {
            reach,
            half_angle: Some(half_angle),
        }
    }

    /// Whether `sphere` intersects this volume when seen from `eye`.
    pub fn intersects(&self, eye: &Transform, sphere: &BoundingSphere) -> bool {
        let to_center = sphere.center - eye.position;
        let dist = to_center.length();

        if dist - sphere.radius > self.reach {
            return false;
        }
        // Eye inside the sphere: always seen.
        if dist <= sphere.radius {
            return true;
        }

        match self.half_angle {
            None => true,
            Some(half_angle) => {
                let forward = eye.forward().normalize_or_zero();
                if forward == Vec3::ZERO {
                    return true;
                }
                let cos = (to_center.dot(forward) / dist).clamp(-1.0, 1.0);
                let off_axis = cos.acos();
                let angular_radius = (sphere.radius / dist).clamp(0.0, 1.0).asin();
                off_axis <= half_angle + angular_radius
            }
        }
    }
}

/// A registered viewpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    pub id: ObserverId,
    pub transform: Transform,
    pub view: ViewVolume,
}

impl Observer {
    pub fn new(transform: Transform, view: ViewVolume) -> Self {
        Self {
            id: ObserverId::new(),
            transform,
            view,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Whether this observer currently sees `sphere`.
    pub fn sees(&self, sphere: &BoundingSphere) -> bool {
        self.view.intersects(&self.transform, sphere)
    }
}
