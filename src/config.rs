//! Comparison configuration
//!
//! Every parameter of a comparison is an explicit value passed down the call
//! chain, so concurrent comparisons with different settings never interfere.

use crate::error::{MeshCompareError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Surface sampling parameters for the directional distance pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Sampling step as a fraction of the reference bounding-box diagonal
    pub step_fraction: f64,

    /// Minimum number of samples along each triangle side
    pub min_sample_freq: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            step_fraction: 0.005,
            min_sample_freq: 2,
        }
    }
}

impl SamplingConfig {
    /// Samples per unit area for a reference of the given bounding-box diagonal
    pub fn density_for_diagonal(&self, diagonal: f64) -> f64 {
        let step = self.step_fraction * diagonal;
        if step > 0.0 && step.is_finite() {
            1.0 / (step * step)
        } else {
            // Point-like reference: fall back to a unit step
            1.0
        }
    }
}

/// How ray crossings decide whether a voxel centre is inside a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FillRule {
    /// Inside when the winding number is non-zero
    #[default]
    NonZero,
    /// Inside when the number of crossings is odd
    EvenOdd,
}

/// Voxelisation parameters for the volume overlap estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    /// Number of voxels along the longest axis of the combined bounding box
    pub resolution: usize,

    /// Inside/outside rule for ray crossings
    pub fill_rule: FillRule,

    /// Fewest voxels across any axis with non-zero extent, so thin shapes
    /// still cover voxel centres
    pub min_axis_cells: usize,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            resolution: 128,
            fill_rule: FillRule::NonZero,
            min_axis_cells: 16,
        }
    }
}

/// Complete configuration for one comparison
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Distance sampling parameters
    pub sampling: SamplingConfig,

    /// Volume overlap parameters
    pub volume: VolumeConfig,
}

impl ComparisonConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MeshCompareError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            MeshCompareError::ConfigError(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            MeshCompareError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content).map_err(|e| {
            MeshCompareError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Check that every parameter is usable
    pub fn validate(&self) -> Result<()> {
        let step = self.sampling.step_fraction;
        if !step.is_finite() || step <= 0.0 {
            return Err(MeshCompareError::ConfigError(format!(
                "step_fraction must be a positive number, got {}",
                step
            )));
        }

        // Two samples per side puts a sample on every triangle corner
        if self.sampling.min_sample_freq < 2 {
            return Err(MeshCompareError::ConfigError(format!(
                "min_sample_freq must be at least 2, got {}",
                self.sampling.min_sample_freq
            )));
        }

        if self.volume.resolution < 1 {
            return Err(MeshCompareError::ConfigError(
                "volume resolution must be at least 1".to_string(),
            ));
        }

        if self.volume.min_axis_cells < 1 {
            return Err(MeshCompareError::ConfigError(
                "volume min_axis_cells must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let config = ComparisonConfig::default();
        assert_eq!(config.sampling.step_fraction, 0.005);
        assert_eq!(config.sampling.min_sample_freq, 2);
        assert_eq!(config.volume.resolution, 128);
        assert_eq!(config.volume.fill_rule, FillRule::NonZero);
        assert_eq!(config.volume.min_axis_cells, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_density_for_diagonal() {
        let sampling = SamplingConfig::default();
        // step = 0.005 * 2 = 0.01 -> density = 10_000
        assert_relative_eq!(sampling.density_for_diagonal(2.0), 10_000.0, epsilon = 1e-6);
        assert_eq!(sampling.density_for_diagonal(0.0), 1.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ComparisonConfig =
            serde_json::from_str(r#"{"volume": {"fill_rule": "even_odd"}}"#).unwrap();

        assert_eq!(config.volume.fill_rule, FillRule::EvenOdd);
        assert_eq!(config.volume.resolution, 128);
        assert_eq!(config.sampling, SamplingConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ComparisonConfig::default();
        config.sampling.step_fraction = 0.0;
        assert!(config.validate().is_err());

        let mut config = ComparisonConfig::default();
        config.sampling.min_sample_freq = 0;
        assert!(config.validate().is_err());

        let mut config = ComparisonConfig::default();
        config.volume.resolution = 0;
        assert!(config.validate().is_err());

        let mut config = ComparisonConfig::default();
        config.volume.min_axis_cells = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_single_sample_per_side_rejected() {
        // One sample per side would skip the triangle corners
        let config: ComparisonConfig =
            serde_json::from_str(r#"{"sampling": {"min_sample_freq": 1}}"#).unwrap();
        assert!(matches!(
            config.validate(),
            Err(MeshCompareError::ConfigError(_))
        ));

        let mut config = ComparisonConfig::default();
        config.sampling.min_sample_freq = 2;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ComparisonConfig::default();
        config.volume.resolution = 64;
        config.to_file(&path).unwrap();

        let loaded = ComparisonConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
