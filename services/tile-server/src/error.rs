//! Request errors and their HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, warn};

/// Result type for request handling.
pub type ServeResult<T> = Result<T, ServeError>;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Path escapes the served root: {0}")]
    PathTraversal(String),

    #[error("Served root {path} is not usable: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::NotFound(_) => StatusCode::NOT_FOUND,
            ServeError::PathTraversal(_) => StatusCode::FORBIDDEN,
            ServeError::InvalidRoot { .. } | ServeError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ServeError::NotFound(_) => "File not found".to_string(),
            ServeError::PathTraversal(path) => {
                warn!(path = %path, "Rejected path outside served root");
                "Forbidden".to_string()
            }
            other => {
                error!(error = %other, "Failed to serve request");
                "Internal server error".to_string()
            }
        };

        (status, message).into_response()
    }
}
