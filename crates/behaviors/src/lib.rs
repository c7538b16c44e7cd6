//! Per-effect LOD behaviors.
//!
//! Each behavior owns a shared handle to the effect it drives, so the host
//! can read the current state after every tick.
//!
//! # Invariants
//! - Zone radii are fixed when the behavior is built.
//! - INVISIBLE always disables the target; VISIBLE always enables it.

mod kind;
mod light;
mod toggle;

pub use kind::{BehaviorKind, EffectHandle};
pub use light::{LightDimmer, LightHandle, PointLight};
pub use toggle::{EnableToggle, Switch, ToggleTarget};

pub fn crate_info() -> &'static str {
    "sightline-behaviors v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    use glam::Vec3;
    use sightline_common::Transform;
    use sightline_culling::{DistanceCulling, shared};
    use sightline_lod::{LodConfig, LodSystem};
    use sightline_registry::{ObserverRegistry, ViewVolume};

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("behaviors"));
    }

    #[test]
    fn animator_follows_approaching_camera() {
        let config = LodConfig {
            live_radii: false,
            ..LodConfig::default()
        };
        let mut system =
            LodSystem::with_registry(config, shared(DistanceCulling::new()), ObserverRegistry::new());
        let cam = system
            .add_observer(Transform::at(Vec3::X * 40.0), ViewVolume::sphere(5.0))
            .unwrap();

        let (behavior, handle) = BehaviorKind::Animator { radius: 10.0 }.build();
        system.spawn(Transform::default(), behavior);

        system.tick(0.016);
        assert!(!handle.is_enabled());

        system.move_observer(cam, Transform::at(Vec3::X * 12.0)).unwrap();
        system.tick(0.016);
        assert!(handle.is_enabled());

        system.move_observer(cam, Transform::at(Vec3::X * 40.0)).unwrap();
        system.tick(0.016);
        assert!(!handle.is_enabled());
    }

    #[test]
    fn light_dims_with_zone() {
        let config = LodConfig {
            live_radii: false,
            ..LodConfig::default()
        };
        let mut system =
            LodSystem::with_registry(config, shared(DistanceCulling::new()), ObserverRegistry::new());
        system
            .add_observer(Transform::at(Vec3::X * 5.0), ViewVolume::sphere(0.5))
            .unwrap();

        let (behavior, handle) = BehaviorKind::Light {
            intensity: 3.0,
            range: 9.0,
        }
        .build();
        let id = system.spawn(Transform::default(), behavior);
        system.tick(1.0);

        // Observer 5 units out only reaches the 6-unit middle zone.
        assert_eq!(system.nearest_zone(id), Some(1));
        let EffectHandle::Light(light) = handle else {
            panic!("expected a light handle");
        };
        let l = *light.borrow();
        assert!(l.enabled);
        // Closeness 1.0 at distance 5: (2/3) of the reference.
        assert!((l.intensity - 2.0).abs() < 1e-5);
    }
}
