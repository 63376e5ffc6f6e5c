//! Error types for pyramid layout operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using PyramidError.
pub type PyramidResult<T> = Result<T, PyramidError>;

/// Errors raised while inspecting a pyramid on disk or building fields.
#[derive(Debug, Error)]
pub enum PyramidError {
    #[error("Pyramid root is not a directory: {0}")]
    InvalidRoot(PathBuf),

    #[error("Failed to scan {path}: {message}")]
    Scan { path: PathBuf, message: String },

    #[error("Field shape {width}x{height} does not match {len} values")]
    ShapeMismatch {
        width: usize,
        height: usize,
        len: usize,
    },
}
