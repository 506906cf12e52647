//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for domain values.
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// A path on the remote store (must start with /)
///
/// Represents collection/resource paths relative to the server URL,
/// e.g. "/backup/photos/img.jpg".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemotePath(String);

impl RemotePath {
    /// Create a new RemotePath
    ///
    /// # Errors
    /// Returns error if path doesn't start with /, contains empty segments,
    /// or contains `.`/`..` segments
    pub fn new(path: String) -> Result<Self, DomainError> {
        if !path.starts_with('/') {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path must start with '/': {path}"
            )));
        }

        if path.len() > 1 && path.contains("//") {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path contains invalid double slashes: {path}"
            )));
        }

        if path.len() > 1 && path.ends_with('/') {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path must not end with '/': {path}"
            )));
        }

        if path.split('/').any(|seg| seg == "." || seg == "..") {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path contains invalid traversal: {path}"
            )));
        }

        Ok(Self(path))
    }

    /// Normalize a user-supplied root such as `"dav/backup/"` or `""`
    ///
    /// Adds the leading slash, drops empty segments and trailing slashes.
    ///
    /// # Errors
    /// Returns error if a segment is `.` or `..`
    pub fn from_root(root: &str) -> Result<Self, DomainError> {
        let segments: Vec<&str> = root.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Ok(Self::root());
        }
        Self::new(format!("/{}", segments.join("/")))
    }

    /// Create the root path "/"
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for "/"
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Join a path component
    ///
    /// # Errors
    /// Returns error if component is empty, contains '/', or is `.`/`..`
    pub fn join(&self, component: &str) -> Result<Self, DomainError> {
        if component.is_empty()
            || component.contains('/')
            || component == "."
            || component == ".."
        {
            return Err(DomainError::InvalidRemotePath(format!(
                "Invalid path component: {component}"
            )));
        }

        let new_path = if self.is_root() {
            format!("/{component}")
        } else {
            format!("{}/{component}", self.0)
        };

        Self::new(new_path)
    }

    /// Get the parent path
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }

        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Get the file name component
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }

        self.0.rsplit('/').next()
    }

    /// Iterate over the path segments, outermost first
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Every ancestor including self, outermost first, excluding the root
    ///
    /// `/a/b/c` yields `/a`, `/a/b`, `/a/b/c`.
    #[must_use]
    pub fn ancestors_inclusive(&self) -> Vec<Self> {
        let mut out = Vec::new();
        let mut current = String::new();
        for seg in self.segments() {
            current.push('/');
            current.push_str(seg);
            out.push(Self(current.clone()));
        }
        out
    }
}

impl Display for RemotePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemotePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for RemotePath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemotePath> for String {
    fn from(path: RemotePath) -> Self {
        path.0
    }
}
