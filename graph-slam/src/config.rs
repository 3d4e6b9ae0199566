use std::fs;
use std::path::Path;

use anyhow::anyhow;
use serde::Deserialize;

use crate::error::{MapError, Result};

/// Configuration of the mapping core.
#[derive(Debug, Deserialize, Clone)]
pub struct MappingConfig {
    /// Side length of a single grid cell in meters.
    pub resolution: f64,

    /// Multiplier in (0, 1] applied to the scan's `range_max`. Beams longer
    /// than `range_max * range_threshold` are considered unreliable and are
    /// not counted as evidence.
    pub range_threshold: f64,

    /// Linear displacement in meters after which the scan matcher retains a new keyframe.
    #[serde(default = "default_keyframe_linear")]
    pub keyframe_distance_linear: f64,

    /// Angular displacement in radians after which the scan matcher retains a new keyframe.
    #[serde(default = "default_keyframe_angular")]
    pub keyframe_distance_angular: f64,
}

fn default_keyframe_linear() -> f64 {
    0.5
}

fn default_keyframe_angular() -> f64 {
    std::f64::consts::FRAC_PI_6
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            resolution: 0.05,
            range_threshold: 1.0,
            keyframe_distance_linear: default_keyframe_linear(),
            keyframe_distance_angular: default_keyframe_angular(),
        }
    }
}

impl MappingConfig {
    /// Loads and validates a configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        // read file contents
        let contents = fs::read_to_string(path)?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| anyhow!(e))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that all values are usable before any grid is built.
    pub fn validate(&self) -> Result<()> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(MapError::InvalidConfig(format!(
                "resolution must be a positive finite number, got {}",
                self.resolution
            )));
        }
        if !self.range_threshold.is_finite()
            || self.range_threshold <= 0.0
            || self.range_threshold > 1.0
        {
            return Err(MapError::InvalidConfig(format!(
                "range_threshold must be in (0, 1], got {}",
                self.range_threshold
            )));
        }
        Ok(())
    }
}
