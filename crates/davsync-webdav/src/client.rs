//! WebDAV HTTP client
//!
//! Provides a typed HTTP client for the handful of WebDAV verbs the sync
//! engine needs. Handles Basic authentication, per-segment URL encoding,
//! and status classification.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use davsync_core::domain::RemotePath;
//! use davsync_webdav::client::WebDavClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = WebDavClient::new("https://dav.example.com/remote.php/webdav", "alice", "secret")?;
//! client.propfind(&RemotePath::root()).await?;
//! client.mkcol(&RemotePath::new("/backup".into())?).await?;
//! # Ok(())
//! # }
//! ```

use reqwest::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, Method, RequestBuilder, StatusCode};
use tracing::debug;
use url::Url;

use davsync_core::config::DavConfig;
use davsync_core::domain::RemotePath;

use crate::WebDavError;

/// Minimal PROPFIND body asking only for the resource type
const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:"><d:prop><d:resourcetype/></d:prop></d:propfind>"#;

// ============================================================================
// WebDavClient
// ============================================================================

/// HTTP client for a WebDAV server
///
/// Wraps `reqwest::Client` with Basic authentication and resource URL
/// construction relative to the configured server URL.
pub struct WebDavClient {
    /// The underlying HTTP client
    client: Client,
    /// Server URL all remote paths are resolved against
    base_url: Url,
    user: String,
    password: String,
}

impl std::fmt::Debug for WebDavClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDavClient")
            .field("base_url", &self.base_url.as_str())
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl WebDavClient {
    /// Creates a new client for `server`
    ///
    /// # Arguments
    /// * `server` - Server URL, e.g. `https://host/remote.php/webdav`
    /// * `user` - Basic auth user name
    /// * `password` - Basic auth password
    ///
    /// # Errors
    /// Returns [`WebDavError::InvalidUrl`] when `server` is not an absolute
    /// URL that can carry a path.
    pub fn new(
        server: &str,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, WebDavError> {
        let base_url =
            Url::parse(server).map_err(|e| WebDavError::InvalidUrl(format!("{server}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(WebDavError::InvalidUrl(server.to_string()));
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            user: user.into(),
            password: password.into(),
        })
    }

    /// Creates a client from the `Server`, `Uid` and `Pwd` config fields
    pub fn from_config(config: &DavConfig) -> Result<Self, WebDavError> {
        Self::new(&config.server, &config.user, &config.password)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `path` against the server URL
    ///
    /// Each segment is percent-encoded. Collections get a trailing slash.
    pub fn url_for(&self, path: &RemotePath, collection: bool) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(path.segments());
            if collection {
                segments.push("");
            }
        }
        url
    }

    /// Creates an authenticated request builder
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.user, Some(&self.password))
    }

    /// Checks that the collection at `path` is reachable
    ///
    /// Sends `PROPFIND` with `Depth: 0`; any 2xx (207 Multi-Status in
    /// practice) is success.
    pub async fn propfind(&self, path: &RemotePath) -> Result<(), WebDavError> {
        let url = self.url_for(path, true);
        debug!(url = %url, "PROPFIND");

        let response = self
            .request(dav_method("PROPFIND")?, url.clone())
            .header("Depth", "0")
            .header(CONTENT_TYPE, HeaderValue::from_static("application/xml"))
            .body(PROPFIND_BODY)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(WebDavError::from_status(status, url.as_str()))
        }
    }

    /// Creates the collection at `path`
    ///
    /// Returns `Ok(true)` when it was created and `Ok(false)` when it
    /// already existed (405 Method Not Allowed, or a 301 redirect to the
    /// slash-terminated collection).
    pub async fn mkcol(&self, path: &RemotePath) -> Result<bool, WebDavError> {
        let url = self.url_for(path, true);
        debug!(url = %url, "MKCOL");

        let response = self
            .request(dav_method("MKCOL")?, url.clone())
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => Ok(true),
            StatusCode::METHOD_NOT_ALLOWED | StatusCode::MOVED_PERMANENTLY => Ok(false),
            s if s.is_success() => Ok(true),
            s => Err(WebDavError::from_status(s, url.as_str())),
        }
    }

    /// Writes `body` to the resource at `path`, replacing existing content
    ///
    /// # Arguments
    /// * `path` - Destination resource
    /// * `body` - Request body, usually a wrapped stream
    /// * `size` - Exact body length, sent as `Content-Length`
    pub async fn put(&self, path: &RemotePath, body: Body, size: u64) -> Result<(), WebDavError> {
        let url = self.url_for(path, false);
        debug!(url = %url, size, "PUT");

        let response = self
            .request(Method::PUT, url.clone())
            .header(CONTENT_LENGTH, size)
            .body(body)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT => Ok(()),
            s => Err(WebDavError::from_status(s, url.as_str())),
        }
    }
}

/// Builds an extension method such as `PROPFIND`
fn dav_method(name: &'static str) -> Result<Method, WebDavError> {
    Method::from_bytes(name.as_bytes())
        .map_err(|e| WebDavError::InvalidUrl(format!("bad method {name}: {e}")))
}
