//! Colorizer configuration.
//!
//! The normalization policy has no default: every caller states how raw
//! heights map onto the color scale.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use netcdf_parser::DEFAULT_VARIABLE;
use pyramid_common::DEFAULT_SOURCE_EXTENSION;
use renderer::colorscale;
use renderer::style::StyleConfig;
use renderer::{ColorScale, ValueRange};

use crate::error::{ColorizeError, Result};

/// Default color scale.
pub const DEFAULT_COLOR_SCALE: &str = "inferno";

/// Default extension of rendered tiles.
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// How raw heights are normalized into [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum NormalizationPolicy {
    /// Values are already in [0, 1]; out-of-range values clamp.
    Identity,
    /// Min-max over each tile on its own.
    PerTile,
    /// Min-max over every tile of the batch.
    Global,
    /// A supplied range shared by every tile.
    Fixed { min: f64, max: f64 },
}

impl NormalizationPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            NormalizationPolicy::Identity => "identity",
            NormalizationPolicy::PerTile => "per-tile",
            NormalizationPolicy::Global => "global",
            NormalizationPolicy::Fixed { .. } => "fixed",
        }
    }

    fn validate(&self) -> Result<()> {
        if let NormalizationPolicy::Fixed { min, max } = *self {
            if !min.is_finite() || !max.is_finite() || max <= min {
                return Err(ColorizeError::InvalidConfig(format!(
                    "fixed normalization needs finite min < max, got [{}, {}]",
                    min, max
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for NormalizationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizationPolicy::Fixed { min, max } => write!(f, "fixed:{}:{}", min, max),
            other => f.write_str(other.name()),
        }
    }
}

/// Parses `identity`, `per-tile`, `global` or `fixed:<min>:<max>`.
impl FromStr for NormalizationPolicy {
    type Err = ColorizeError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "identity" => return Ok(NormalizationPolicy::Identity),
            "per-tile" | "per_tile" => return Ok(NormalizationPolicy::PerTile),
            "global" => return Ok(NormalizationPolicy::Global),
            _ => {}
        }

        let bad = || {
            ColorizeError::InvalidConfig(format!(
                "unknown normalization '{}' (expected identity, per-tile, global or fixed:<min>:<max>)",
                s
            ))
        };
        let range = lower.strip_prefix("fixed:").ok_or_else(bad)?;
        let (min, max) = range.split_once(':').ok_or_else(bad)?;
        let min: f64 = min.trim().parse().map_err(|_| bad())?;
        let max: f64 = max.trim().parse().map_err(|_| bad())?;

        let policy = NormalizationPolicy::Fixed { min, max };
        policy.validate()?;
        Ok(policy)
    }
}

/// Settings for a colorizing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorizeConfig {
    /// Variable read from each tile.
    #[serde(default = "default_variable")]
    pub variable: String,

    /// Built-in scale name, or a style name when `style_file` is set.
    #[serde(default = "default_color_scale")]
    pub color_scale: String,

    /// JSON style file with custom color scales.
    #[serde(default)]
    pub style_file: Option<PathBuf>,

    pub normalization: NormalizationPolicy,

    /// Extension of source tiles, without the dot.
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    /// Extension of written images, without the dot.
    #[serde(default = "default_image_extension")]
    pub image_extension: String,

    /// Worker threads; defaults to the number of CPUs.
    #[serde(default)]
    pub workers: Option<usize>,

    /// Stop starting new tiles after the first failure.
    #[serde(default)]
    pub fail_fast: bool,
}

fn default_variable() -> String {
    DEFAULT_VARIABLE.to_string()
}

fn default_color_scale() -> String {
    DEFAULT_COLOR_SCALE.to_string()
}

fn default_source_extension() -> String {
    DEFAULT_SOURCE_EXTENSION.to_string()
}

fn default_image_extension() -> String {
    DEFAULT_IMAGE_EXTENSION.to_string()
}

impl ColorizeConfig {
    /// Configuration with defaults for everything except normalization.
    pub fn new(normalization: NormalizationPolicy) -> Self {
        Self {
            variable: default_variable(),
            color_scale: default_color_scale(),
            style_file: None,
            normalization,
            source_extension: default_source_extension(),
            image_extension: default_image_extension(),
            workers: None,
            fail_fast: false,
        }
    }

    pub fn with_color_scale(mut self, name: impl Into<String>) -> Self {
        self.color_scale = name.into();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Worker count after applying the CPU default.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Image extension without a leading dot.
    pub fn image_extension(&self) -> &str {
        self.image_extension.trim_start_matches('.')
    }

    /// Source extension without a leading dot.
    pub fn source_extension(&self) -> &str {
        self.source_extension.trim_start_matches('.')
    }

    /// Check everything that can be checked before touching any tile.
    pub fn validate(&self) -> Result<()> {
        if self.variable.trim().is_empty() {
            return Err(ColorizeError::InvalidConfig(
                "variable name cannot be empty".to_string(),
            ));
        }
        if self.image_extension().is_empty() {
            return Err(ColorizeError::InvalidConfig(
                "image extension cannot be empty".to_string(),
            ));
        }
        if self
            .image_extension()
            .eq_ignore_ascii_case(self.source_extension())
        {
            return Err(ColorizeError::InvalidConfig(format!(
                "image extension '{}' would overwrite source tiles",
                self.image_extension()
            )));
        }
        if self.workers == Some(0) {
            return Err(ColorizeError::InvalidConfig(
                "workers must be greater than 0".to_string(),
            ));
        }
        self.normalization.validate()
    }

    /// Resolve the configured color scale.
    pub fn resolve_color_scale(&self) -> Result<ColorScale> {
        let scale = match &self.style_file {
            Some(path) => StyleConfig::from_file(path)
                .and_then(|styles| styles.color_scale(&self.color_scale)),
            None => colorscale::builtin(&self.color_scale).map(|scale| scale.clone()),
        };
        scale.map_err(|e| ColorizeError::InvalidConfig(e.to_string()))
    }

    /// The fixed range, when the policy carries one.
    pub fn fixed_range(&self) -> Option<ValueRange> {
        match self.normalization {
            NormalizationPolicy::Fixed { min, max } => Some(ValueRange::new(min, max)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policies() {
        assert_eq!(
            "identity".parse::<NormalizationPolicy>().unwrap(),
            NormalizationPolicy::Identity
        );
        assert_eq!(
            "Per-Tile".parse::<NormalizationPolicy>().unwrap(),
            NormalizationPolicy::PerTile
        );
        assert_eq!(
            "global".parse::<NormalizationPolicy>().unwrap(),
            NormalizationPolicy::Global
        );
        assert_eq!(
            "fixed:-2.5:10".parse::<NormalizationPolicy>().unwrap(),
            NormalizationPolicy::Fixed { min: -2.5, max: 10.0 }
        );
    }

    #[test]
    fn test_parse_rejects_bad_policies() {
        for bad in ["", "minmax", "fixed", "fixed:1", "fixed:a:b", "fixed:5:5", "fixed:3:1"] {
            assert!(bad.parse::<NormalizationPolicy>().is_err(), "{bad}");
        }
    }

    #[test]
    fn test_display_round_trips() {
        let policy = NormalizationPolicy::Fixed { min: -1.0, max: 1.5 };
        assert_eq!(policy.to_string(), "fixed:-1:1.5");
        assert_eq!(policy.to_string().parse::<NormalizationPolicy>().unwrap(), policy);
    }

    #[test]
    fn test_defaults() {
        let config = ColorizeConfig::new(NormalizationPolicy::PerTile);
        assert_eq!(config.variable, "heights");
        assert_eq!(config.color_scale, "inferno");
        assert_eq!(config.image_extension(), "png");
        assert!(config.worker_count() >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let mut config = ColorizeConfig::new(NormalizationPolicy::Identity).with_workers(0);
        assert!(config.validate().is_err());

        config.workers = Some(2);
        config.image_extension = ".".to_string();
        assert!(config.validate().is_err());

        config.image_extension = ".png".to_string();
        config.normalization = NormalizationPolicy::Fixed { min: 1.0, max: f64::NAN };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_image_extension_must_differ_from_source() {
        let mut config = ColorizeConfig::new(NormalizationPolicy::PerTile);
        for ext in ["nc", ".NC", "Nc"] {
            config.image_extension = ext.to_string();
            let err = config.validate().unwrap_err();
            assert_eq!(err.kind(), "invalid_config", "{ext}");
        }

        config.source_extension = "cdf".to_string();
        config.image_extension = "nc".to_string();
        assert!(config.validate().is_ok());
        config.image_extension = "CDF".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_color_scale_is_invalid_config() {
        let config = ColorizeConfig::new(NormalizationPolicy::Identity).with_color_scale("jet");
        let err = config.resolve_color_scale().unwrap_err();
        assert_eq!(err.kind(), "invalid_config");
        assert!(err.to_string().contains("viridis"));
    }

    #[test]
    fn test_deserialize_from_json() {
        let config: ColorizeConfig = serde_json::from_str(
            r#"{"normalization": {"policy": "fixed", "min": 0, "max": 8}, "color_scale": "magma"}"#,
        )
        .unwrap();
        assert_eq!(config.fixed_range(), Some(ValueRange::new(0.0, 8.0)));
        assert_eq!(config.color_scale, "magma");
        assert_eq!(config.variable, "heights");

        // Normalization is required
        assert!(serde_json::from_str::<ColorizeConfig>(r#"{"color_scale": "magma"}"#).is_err());
    }
}
