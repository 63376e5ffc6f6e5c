//! Error types for the tile colorizer.

use std::path::PathBuf;
use thiserror::Error;

use netcdf_parser::NetCdfError;
use renderer::RenderError;

/// Errors that can occur while colorizing tiles.
#[derive(Error, Debug)]
pub enum ColorizeError {
    #[error("Cannot read source tile {path}: {reason}")]
    UnreadableSource { path: PathBuf, reason: String },

    #[error("Variable '{variable}' not found in {path} (available: {})", .available.join(", "))]
    MissingVariable {
        path: PathBuf,
        variable: String,
        available: Vec<String>,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image for {path} would replace the source tile")]
    OverwritesSource { path: PathBuf },

    #[error("Failed to render tile: {0}")]
    Render(#[from] RenderError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),
}

impl ColorizeError {
    /// Stable machine-readable name of the error kind, used in batch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ColorizeError::UnreadableSource { .. } => "unreadable_source",
            ColorizeError::MissingVariable { .. } => "missing_variable",
            ColorizeError::WriteFailure { .. } => "write_failure",
            ColorizeError::OverwritesSource { .. } => "overwrites_source",
            ColorizeError::Render(_) => "render",
            ColorizeError::InvalidConfig(_) => "invalid_config",
            ColorizeError::WorkerPool(_) => "worker_pool",
        }
    }

    pub(crate) fn from_netcdf(path: &std::path::Path, err: NetCdfError) -> Self {
        match err {
            NetCdfError::MissingVariable {
                path,
                variable,
                available,
            } => ColorizeError::MissingVariable {
                path,
                variable,
                available,
            },
            NetCdfError::Unreadable { path, reason } => {
                ColorizeError::UnreadableSource { path, reason }
            }
            other => ColorizeError::UnreadableSource {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        }
    }
}

/// Result type for colorizer operations.
pub type Result<T> = std::result::Result<T, ColorizeError>;
