//! Domain error types
//!
//! This module defines error types specific to domain operations:
//! path validation failures and the fatal conditions that mark a sync run
//! as failed.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid remote path format
    #[error("Invalid remote path: {0}")]
    InvalidRemotePath(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

/// A condition that marks the whole run as failed
///
/// Fatal errors abandon (part of) the current directory but never undo
/// work already recorded, and they never prevent state persistence. They
/// do suppress the completion notification.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FatalError {
    /// A directory could not be listed; none of its entries were processed
    #[error("Can't read directory {}: {reason}", path.display())]
    ListDirectory {
        /// The local directory that failed to list
        path: PathBuf,
        /// Underlying I/O error message
        reason: String,
    },

    /// A file could not be stat'ed or opened; the rest of its directory was skipped
    #[error("Can't access file {}: {reason}", path.display())]
    FileAccess {
        /// The local file that could not be accessed
        path: PathBuf,
        /// Underlying I/O error message
        reason: String,
    },
}

impl FatalError {
    /// The local path the error refers to
    pub fn path(&self) -> &std::path::Path {
        match self {
            FatalError::ListDirectory { path, .. } | FatalError::FileAccess { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidRemotePath("dav//x".to_string());
        assert_eq!(err.to_string(), "Invalid remote path: dav//x");

        let err = FatalError::ListDirectory {
            path: PathBuf::from("/data/photos"),
            reason: "Permission denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Can't read directory /data/photos: Permission denied"
        );
    }

    #[test]
    fn test_fatal_error_path() {
        let err = FatalError::FileAccess {
            path: PathBuf::from("/data/a.txt"),
            reason: "No such file or directory".to_string(),
        };
        assert_eq!(err.path(), std::path::Path::new("/data/a.txt"));
    }

    #[test]
    fn test_fatal_error_serializes_with_kind_tag() {
        let err = FatalError::ListDirectory {
            path: PathBuf::from("/data/photos"),
            reason: "Permission denied".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({
                "kind": "list_directory",
                "path": "/data/photos",
                "reason": "Permission denied",
            })
        );

        let err = FatalError::FileAccess {
            path: PathBuf::from("/data/a.txt"),
            reason: "gone".to_string(),
        };
        assert_eq!(serde_json::to_value(&err).unwrap()["kind"], "file_access");
    }
}
