use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::proximity::DistanceRange;

/// Errors from loading or validating an [`LodConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables shared by every managed object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodConfig {
    /// Frames between nearest-observer refreshes.
    pub observer_refresh_interval: u64,
    /// Default near/far pair for distance-sensitive behaviors.
    pub distance: DistanceRange,
    /// Closeness passed to behaviors that ignore distance.
    pub fixed_closeness: f32,
    /// Re-read behavior radii every tick.
    pub live_radii: bool,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            observer_refresh_interval: 30,
            distance: DistanceRange::default(),
            fixed_closeness: 0.0,
            live_radii: cfg!(debug_assertions),
        }
    }
}

impl LodConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.observer_refresh_interval == 0 {
            return Err(ConfigError::Invalid(
                "observer_refresh_interval must be at least 1".into(),
            ));
        }
        let DistanceRange { min, max } = self.distance;
        if min.is_nan() || max.is_nan() || max <= min {
            return Err(ConfigError::Invalid(format!(
                "distance.max ({max}) must exceed distance.min ({min})"
            )));
        }
        if !(0.0..=1.0).contains(&self.fixed_closeness) {
            return Err(ConfigError::Invalid(format!(
                "fixed_closeness ({}) must lie in [0, 1]",
                self.fixed_closeness
            )));
        }
        Ok(())
    }

    /// Parse and validate a YAML document. Missing keys take defaults.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&data)
    }
}
