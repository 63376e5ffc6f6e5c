//! Mapping request paths onto the served directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ServeError, ServeResult};

/// What a request path points at below the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    File(PathBuf),
    Directory(PathBuf),
}

/// Canonicalize the directory to serve.
pub fn canonical_root(root: &Path) -> ServeResult<PathBuf> {
    let canonical = fs::canonicalize(root).map_err(|e| ServeError::InvalidRoot {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !canonical.is_dir() {
        return Err(ServeError::InvalidRoot {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }
    Ok(canonical)
}

/// Resolve a percent-decoded request path against a canonical root.
///
/// `..` segments and backslashes are rejected outright. Whatever remains is
/// canonicalized, so a symlink pointing outside the root is rejected too.
pub fn resolve(root: &Path, request_path: &str) -> ServeResult<Resolved> {
    if request_path.contains('\\') || request_path.contains('\0') {
        return Err(ServeError::PathTraversal(request_path.to_string()));
    }

    let mut candidate = root.to_path_buf();
    for segment in request_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(ServeError::PathTraversal(request_path.to_string())),
            segment => candidate.push(segment),
        }
    }

    let canonical = match fs::canonicalize(&candidate) {
        Ok(path) => path,
        Err(_) if !candidate.exists() => {
            return Err(ServeError::NotFound(request_path.to_string()))
        }
        Err(e) => return Err(ServeError::Io(e)),
    };

    if !canonical.starts_with(root) {
        return Err(ServeError::PathTraversal(request_path.to_string()));
    }

    if canonical.is_dir() {
        Ok(Resolved::Directory(canonical))
    } else if request_path.ends_with('/') {
        // A trailing slash only names directories
        Err(ServeError::NotFound(request_path.to_string()))
    } else {
        Ok(Resolved::File(canonical))
    }
}
