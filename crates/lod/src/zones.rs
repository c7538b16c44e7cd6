use glam::Vec3;
use sightline_common::BoundingSphere;

/// One concentric visibility threshold around an object. Index 0 is nearest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub index: usize,
    pub radius: f32,
}

/// Reasons a radius list is rejected by [`ZoneSet::validated`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ZoneError {
    #[error("zone list is empty")]
    Empty,
    #[error("zone {index} has non-positive radius {radius}")]
    NonPositive { index: usize, radius: f32 },
    #[error("zone {index} radius {radius} does not exceed previous radius {previous}")]
    NotIncreasing {
        index: usize,
        radius: f32,
        previous: f32,
    },
}

/// Ordered set of zones derived from a behavior's radius list.
///
/// Radii are expected to be positive and strictly increasing. `new` accepts
/// anything: with unordered radii the nearest-zone index still reports the
/// smallest visible index, which no longer means the smallest visible sphere.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneSet {
    zones: Vec<Zone>,
}

impl ZoneSet {
    /// Build zones without validation. Malformed input is logged.
    pub fn new(radii: &[f32]) -> Self {
        if let Err(err) = Self::check(radii) {
            tracing::warn!(%err, ?radii, "malformed zone radii; nearest-zone output degrades");
        }
        Self::from_radii(radii)
    }

    /// Build zones, rejecting empty, non-positive or non-increasing radii.
    pub fn validated(radii: &[f32]) -> Result<Self, ZoneError> {
        Self::check(radii)?;
        Ok(Self::from_radii(radii))
    }

    /// Validate a radius list without building zones.
    pub fn check(radii: &[f32]) -> Result<(), ZoneError> {
        if radii.is_empty() {
            return Err(ZoneError::Empty);
        }
        for (index, &radius) in radii.iter().enumerate() {
            if radius <= 0.0 || radius.is_nan() {
                return Err(ZoneError::NonPositive { index, radius });
            }
            if index > 0 && radius <= radii[index - 1] {
                return Err(ZoneError::NotIncreasing {
                    index,
                    radius,
                    previous: radii[index - 1],
                });
            }
        }
        Ok(())
    }

    fn from_radii(radii: &[f32]) -> Self {
        Self {
            zones: radii
                .iter()
                .enumerate()
                .map(|(index, &radius)| Zone { index, radius })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn get(&self, index: usize) -> Option<&Zone> {
        self.zones.get(index)
    }

    /// Whether radii strictly increase with index.
    pub fn is_ordered(&self) -> bool {
        self.zones.windows(2).all(|w| w[0].radius < w[1].radius)
    }

    /// Overwrite radii in place, keeping the zone count.
    ///
    /// Extra or missing entries in `radii` are ignored.
    pub fn refresh_radii(&mut self, radii: &[f32]) {
        for (zone, &radius) in self.zones.iter_mut().zip(radii) {
            zone.radius = radius;
        }
    }

    /// Spheres centered at `center`, one per zone, in zone order.
    pub fn spheres(&self, center: Vec3) -> Vec<BoundingSphere> {
        self.zones
            .iter()
            .map(|z| BoundingSphere::new(center, z.radius))
            .collect()
    }
}
