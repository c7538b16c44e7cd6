use serde::{Deserialize, Serialize};

/// Near/far distance pair used to map observer distance to closeness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceRange {
    /// At or inside this distance closeness is 1.
    pub min: f32,
    /// At or beyond this distance closeness is 0.
    pub max: f32,
}

impl Default for DistanceRange {
    fn default() -> Self {
        Self {
            min: 10.0,
            max: 15.0,
        }
    }
}

impl DistanceRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn closeness(&self, distance: f32) -> f32 {
        normalize(distance, self.min, self.max)
    }
}

/// Map `distance` to closeness in `[0, 1]`, linear between `min` and `max`.
///
/// Requires `max > min`.
pub fn normalize(distance: f32, min: f32, max: f32) -> f32 {
    if distance <= min {
        return 1.0;
    }
    if distance >= max {
        return 0.0;
    }
    1.0 - (distance - min) / (max - min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_at_both_ends() {
        assert_eq!(normalize(10.0, 10.0, 15.0), 1.0);
        assert_eq!(normalize(0.0, 10.0, 15.0), 1.0);
        assert_eq!(normalize(15.0, 10.0, 15.0), 0.0);
        assert_eq!(normalize(100.0, 10.0, 15.0), 0.0);
    }

    #[test]
    fn linear_in_between() {
        assert_eq!(normalize(12.5, 10.0, 15.0), 0.5);
        let a = normalize(11.0, 10.0, 15.0);
        let b = normalize(14.0, 10.0, 15.0);
        assert!((a - 0.8).abs() < 1e-6);
        assert!((b - 0.2).abs() < 1e-6);
    }

    #[test]
    fn monotonic_and_continuous() {
        let range = DistanceRange::default();
        let mut prev = range.closeness(9.0);
        let mut d = 9.0;
        while d < 16.0 {
            d += 0.01;
            let c = range.closeness(d);
            assert!(c <= prev);
            assert!(prev - c < 0.01);
            assert!((0.0..=1.0).contains(&c));
            prev = c;
        }
    }
}
