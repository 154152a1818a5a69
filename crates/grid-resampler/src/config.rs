//! Configuration for the resampler.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the resampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResamplerConfig {
    /// Target grid spacing in degrees for both latitude and longitude.
    pub resolution_deg: f64,

    /// Interpolated missing-indicator value at or above which a cell is blanked.
    pub land_threshold: f64,

    /// What to do when a slice's radial basis fit is singular.
    pub slice_failure: SliceFailurePolicy,

    /// Resample independent variables on the rayon pool.
    pub parallel_variables: bool,

    /// Smallest LU pivot, relative to the largest, accepted as non-singular.
    pub singularity_tolerance: f64,
}

impl Default for ResamplerConfig {
    fn default() -> Self {
        Self {
            resolution_deg: 0.15,
            land_threshold: 0.5,
            slice_failure: SliceFailurePolicy::OmitVariable,
            parallel_variables: false,
            singularity_tolerance: 1e-12,
        }
    }
}

impl ResamplerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RESAMPLER_RESOLUTION_DEG") {
            if let Ok(resolution) = val.parse() {
                config.resolution_deg = resolution;
            }
        }

        if let Ok(val) = std::env::var("RESAMPLER_LAND_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.land_threshold = threshold;
            }
        }

        if let Ok(val) = std::env::var("RESAMPLER_SLICE_FAILURE") {
            config.slice_failure = SliceFailurePolicy::from_str(&val);
        }

        if let Ok(val) = std::env::var("RESAMPLER_PARALLEL_VARIABLES") {
            config.parallel_variables = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("RESAMPLER_SINGULARITY_TOLERANCE") {
            if let Ok(tolerance) = val.parse() {
                config.singularity_tolerance = tolerance;
            }
        }

        config
    }

    /// Parse YAML; absent keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("Failed to parse resampler config")?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid resampler config: {}", e))?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml_str(&contents)
            .with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.resolution_deg.is_finite() && self.resolution_deg > 0.0) {
            return Err("resolution_deg must be a positive number".to_string());
        }

        if !(self.land_threshold > 0.0 && self.land_threshold <= 1.0) {
            return Err("land_threshold must be in (0, 1]".to_string());
        }

        if !(self.singularity_tolerance.is_finite() && self.singularity_tolerance > 0.0) {
            return Err("singularity_tolerance must be > 0".to_string());
        }

        Ok(())
    }
}

/// Handling of slices whose spatial fit fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceFailurePolicy {
    /// Drop every output derived from the variable.
    #[default]
    OmitVariable,
    /// Keep the variable with the failed slice left missing.
    FillMissing,
}

impl SliceFailurePolicy {
    /// Parse from string (case-insensitive); unknown values fall back to the default.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "fill_missing" | "fill" => Self::FillMissing,
            _ => Self::OmitVariable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OmitVariable => "omit_variable",
            Self::FillMissing => "fill_missing",
        }
    }
}

impl std::fmt::Display for SliceFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ResamplerConfig::default();
        assert_eq!(config.resolution_deg, 0.15);
        assert_eq!(config.land_threshold, 0.5);
        assert_eq!(config.slice_failure, SliceFailurePolicy::OmitVariable);
        assert!(!config.parallel_variables);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ResamplerConfig::default();
        config.resolution_deg = 0.0;
        assert!(config.validate().is_err());

        config = ResamplerConfig::default();
        config.land_threshold = 0.0;
        assert!(config.validate().is_err());

        config.land_threshold = 1.5;
        assert!(config.validate().is_err());

        config = ResamplerConfig::default();
        config.singularity_tolerance = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config =
            ResamplerConfig::from_yaml_str("resolution_deg: 0.25\nslice_failure: fill_missing\n")
                .unwrap();
        assert_eq!(config.resolution_deg, 0.25);
        assert_eq!(config.slice_failure, SliceFailurePolicy::FillMissing);
        assert_eq!(config.land_threshold, 0.5);
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        assert!(ResamplerConfig::from_yaml_str("land_threshold: 2.0\n").is_err());
        assert!(ResamplerConfig::from_yaml_str("slice_failure: [oops\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "land_threshold: 0.4").unwrap();
        writeln!(file, "parallel_variables: true").unwrap();
        let config = ResamplerConfig::load(file.path()).unwrap();
        assert_eq!(config.land_threshold, 0.4);
        assert!(config.parallel_variables);

        assert!(ResamplerConfig::load("/nonexistent/resampler.yaml").is_err());
    }

    #[test]
    fn test_slice_failure_from_str() {
        assert_eq!(
            SliceFailurePolicy::from_str("FILL_MISSING"),
            SliceFailurePolicy::FillMissing
        );
        assert_eq!(
            SliceFailurePolicy::from_str("omit_variable"),
            SliceFailurePolicy::OmitVariable
        );
        assert_eq!(SliceFailurePolicy::from_str("bogus"), SliceFailurePolicy::OmitVariable);
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("RESAMPLER_RESOLUTION_DEG", "0.5");
        std::env::set_var("RESAMPLER_LAND_THRESHOLD", "not-a-number");
        std::env::set_var("RESAMPLER_SLICE_FAILURE", "fill");
        std::env::set_var("RESAMPLER_PARALLEL_VARIABLES", "TRUE");
        std::env::set_var("RESAMPLER_SINGULARITY_TOLERANCE", "1e-9");

        let config = ResamplerConfig::from_env();
        assert_eq!(config.resolution_deg, 0.5);
        // Unparsable values keep the default.
        assert_eq!(config.land_threshold, 0.5);
        assert_eq!(config.slice_failure, SliceFailurePolicy::FillMissing);
        assert!(config.parallel_variables);
        assert_eq!(config.singularity_tolerance, 1e-9);

        for key in [
            "RESAMPLER_RESOLUTION_DEG",
            "RESAMPLER_LAND_THRESHOLD",
            "RESAMPLER_SLICE_FAILURE",
            "RESAMPLER_PARALLEL_VARIABLES",
            "RESAMPLER_SINGULARITY_TOLERANCE",
        ] {
            std::env::remove_var(key);
        }
    }
}
