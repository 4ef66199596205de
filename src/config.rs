use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TraceError;

/// All tracing parameters in one struct.
///
/// Built once per run and passed by reference to every stage.
/// Serializable so presets can be saved next to the source frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    // -- Edge detection --
    /// Luma delta (left or up neighbor) above which a pixel is an edge point.
    pub grey_threshold: u8,
    /// Edge length of the square blocks bounding the neighbor search, in pixels.
    pub block_size: u32,

    // -- Tracing --
    /// A nearest candidate farther than this starts a new cluster.
    pub cluster_cutoff_distance: f64,
    /// A candidate farther than this from the segment start ends the segment.
    pub line_cutoff_distance: f64,
    /// Cosine of the largest allowed deviation from the segment direction
    /// once in long-line mode. Lower = more tolerant.
    pub line_cutoff_angle: f64,
    /// Distance after which the segment direction is captured and
    /// angular deviation starts ending segments.
    pub long_line_distance: f64,

    // -- Optimization --
    /// Merge consecutive segments into one.
    pub optimize: bool,
    /// Cosine threshold above which consecutive segments count as collinear.
    pub optimization_cutoff_angle: f64,

    /// Emit per-step diagnostics through `tracing` at debug level.
    pub verbose: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            grey_threshold: 128,
            block_size: 8,
            cluster_cutoff_distance: 5.0,
            line_cutoff_distance: 5.0,
            line_cutoff_angle: 0.9,
            long_line_distance: 3.0,
            optimize: true,
            optimization_cutoff_angle: 0.95,
            verbose: false,
        }
    }
}

impl TracingConfig {
    /// Load a JSON preset. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, TraceError> {
        let data = fs::read_to_string(path)
            .map_err(|e| TraceError::Config(format!("{}: {e}", path.display())))?;
        let config: TracingConfig = serde_json::from_str(&data)
            .map_err(|e| TraceError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Save as a pretty-printed JSON preset.
    pub fn save(&self, path: &Path) -> Result<(), TraceError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| TraceError::Config(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reject parameter sets the tracer cannot run with.
    pub fn validate(&self) -> Result<(), TraceError> {
        if self.block_size == 0 {
            return Err(TraceError::InvalidConfig("block_size must be > 0".into()));
        }
        if i32::try_from(self.block_size).is_err() {
            return Err(TraceError::InvalidConfig(format!(
                "block_size must be at most {}, got {}",
                i32::MAX,
                self.block_size
            )));
        }
        let distances = [
            ("cluster_cutoff_distance", self.cluster_cutoff_distance),
            ("line_cutoff_distance", self.line_cutoff_distance),
            ("long_line_distance", self.long_line_distance),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(TraceError::InvalidConfig(format!(
                    "{name} must be a finite non-negative distance, got {value}"
                )));
            }
        }
        let cosines = [
            ("line_cutoff_angle", self.line_cutoff_angle),
            ("optimization_cutoff_angle", self.optimization_cutoff_angle),
        ];
        for (name, value) in cosines {
            if !(-1.0..=1.0).contains(&value) {
                return Err(TraceError::InvalidConfig(format!(
                    "{name} is a cosine and must lie in [-1, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(TracingConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_block_size_is_rejected() {
        let config = TracingConfig {
            block_size: 0,
            ..TracingConfig::default()
        };
        assert!(matches!(config.validate(), Err(TraceError::InvalidConfig(_))));
    }

    #[test]
    fn block_size_beyond_pixel_range_is_rejected() {
        let config = TracingConfig {
            block_size: u32::MAX,
            ..TracingConfig::default()
        };
        assert!(matches!(config.validate(), Err(TraceError::InvalidConfig(_))));

        let largest = TracingConfig {
            block_size: i32::MAX as u32,
            ..TracingConfig::default()
        };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn cosine_out_of_range_is_rejected() {
        let config = TracingConfig {
            line_cutoff_angle: 1.5,
            ..TracingConfig::default()
        };
        assert!(matches!(config.validate(), Err(TraceError::InvalidConfig(_))));
    }

    #[test]
    fn partial_preset_keeps_defaults() {
        let config: TracingConfig =
            serde_json::from_str(r#"{ "grey_threshold": 32, "verbose": true }"#).unwrap();
        assert_eq!(config.grey_threshold, 32);
        assert!(config.verbose);
        assert_eq!(config.block_size, 8);
        assert_eq!(config.optimization_cutoff_angle, 0.95);
    }
}
