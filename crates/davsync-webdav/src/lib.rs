//! davsync WebDAV - HTTP adapters for the sync engine
//!
//! Provides async adapters for:
//! - WebDAV collections and resources (PROPFIND, MKCOL, PUT) with Basic auth
//! - The post-run completion callback (a single GET)
//!
//! ## Modules
//!
//! - [`client`] - Low-level WebDAV HTTP client
//! - [`provider`] - [`IRemoteStore`](davsync_core::ports::IRemoteStore) implementation
//! - [`notify`] - [`ICompletionNotifier`](davsync_core::ports::ICompletionNotifier) over HTTP

pub mod client;
pub mod notify;
pub mod provider;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to a WebDAV server
#[derive(Debug, Error)]
pub enum WebDavError {
    /// Credentials were rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions for the requested operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A parent collection is missing
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The server ran out of space for the resource
    #[error("Insufficient storage: {0}")]
    InsufficientStorage(String),

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// Any other status the operation does not accept
    #[error("Unexpected status {status} for {url}")]
    UnexpectedStatus { status: StatusCode, url: String },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The server URL can't be used as a base for resource URLs
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

impl WebDavError {
    /// Maps a non-accepted response status to an error
    pub fn from_status(status: StatusCode, url: &str) -> Self {
        let detail = format!("{} {url}", status.as_u16());
        match status {
            StatusCode::UNAUTHORIZED => WebDavError::Unauthorized(detail),
            StatusCode::FORBIDDEN => WebDavError::Forbidden(detail),
            StatusCode::NOT_FOUND => WebDavError::NotFound(detail),
            StatusCode::CONFLICT => WebDavError::Conflict(detail),
            StatusCode::INSUFFICIENT_STORAGE => WebDavError::InsufficientStorage(detail),
            s if s.is_server_error() => WebDavError::ServerError(detail),
            _ => WebDavError::UnexpectedStatus {
                status,
                url: url.to_string(),
            },
        }
    }
}
