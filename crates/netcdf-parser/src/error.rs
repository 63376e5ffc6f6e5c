//! Error types for NetCDF parsing operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// File is missing, corrupt, or not a NetCDF container
    #[error("Cannot read {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    /// The requested variable does not exist in the file
    #[error("Variable '{variable}' not found in {path} (available: {})", .available.join(", "))]
    MissingVariable {
        path: PathBuf,
        variable: String,
        available: Vec<String>,
    },

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}
