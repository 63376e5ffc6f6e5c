//! Configuration loader for the colorize CLI.
//!
//! A YAML file may hold any of the command-line settings. Values given on
//! the command line win over the file. `${VAR}` and `${VAR:-default}` are
//! substituted from the environment before parsing, and paths may start
//! with `~`.
//!
//! ```yaml
//! root: ${TILE_ROOT:-/data/pyramid}
//! levels: [9, 10]
//! color_scale: viridis
//! normalization:
//!   policy: fixed
//!   min: -3.0
//!   max: 3.0
//! workers: 8
//! report: ~/colorize-report.json
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use tile_colorizer::NormalizationPolicy;

/// Settings read from a YAML config file. Everything is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub tiles: Option<Vec<String>>,
    pub root: Option<String>,
    pub levels: Option<Vec<u32>>,
    pub source_extension: Option<String>,
    pub variable: Option<String>,
    pub color_scale: Option<String>,
    pub style_file: Option<String>,
    pub normalization: Option<NormalizationPolicy>,
    pub image_extension: Option<String>,
    pub workers: Option<usize>,
    pub fail_fast: Option<bool>,
    pub report: Option<String>,
}

impl FileConfig {
    pub fn tiles(&self) -> Vec<PathBuf> {
        self.tiles.iter().flatten().map(|t| expand_path(t)).collect()
    }

    pub fn root(&self) -> Option<PathBuf> {
        self.root.as_deref().map(expand_path)
    }

    pub fn style_file(&self) -> Option<PathBuf> {
        self.style_file.as_deref().map(expand_path)
    }

    pub fn report(&self) -> Option<PathBuf> {
        self.report.as_deref().map(expand_path)
    }
}

/// Load and parse a config file with environment variable substitution.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config from {:?}", path.as_ref()))?;

    parse_config(&content)
        .with_context(|| format!("Failed to parse config from {:?}", path.as_ref()))
}

/// Parse config YAML after substituting environment variables.
pub fn parse_config(content: &str) -> Result<FileConfig> {
    let expanded = shellexpand::env(content).context("Environment variable substitution failed")?;
    let config: FileConfig = serde_yaml::from_str(&expanded)?;
    Ok(config)
}

/// Expand a leading `~` in a path.
fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}
