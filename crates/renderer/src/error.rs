//! Error types for rendering and encoding.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors raised while building color scales or producing images.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unknown color scale '{name}' (available: {})", .available.join(", "))]
    UnknownColorScale { name: String, available: Vec<String> },

    #[error("Invalid color scale '{name}': {reason}")]
    InvalidColorScale { name: String, reason: String },

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Style '{0}' not found")]
    StyleNotFound(String),

    #[error("Failed to load style file {path}: {reason}")]
    StyleFile { path: PathBuf, reason: String },

    #[error("Pixel buffer of {len} bytes does not match a {width}x{height} RGB image")]
    ShapeMismatch {
        width: usize,
        height: usize,
        len: usize,
    },

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}
