//! WebDavRemoteStore - IRemoteStore implementation over WebDAV
//!
//! Wraps the [`WebDavClient`] to fulfil the [`IRemoteStore`] port contract.
//!
//! ## Design Notes
//!
//! - `ensure_directory` issues one `MKCOL` per ancestor, outermost first;
//!   existing collections answer 405 and are accepted.
//! - `write_stream` hands the local reader to reqwest as a streamed body,
//!   so file contents are never buffered whole in memory.
//! - A 409 on `PUT` means a parent collection is missing. The parents are
//!   created, but the body stream is already consumed, so the write is
//!   still reported as failed and the engine retries it on the next run.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Body;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use davsync_core::domain::RemotePath;
use davsync_core::ports::{ByteSource, IRemoteStore};

use crate::client::WebDavClient;
use crate::WebDavError;

/// WebDAV implementation of [`IRemoteStore`]
#[derive(Debug)]
pub struct WebDavRemoteStore {
    client: WebDavClient,
}

impl WebDavRemoteStore {
    pub fn new(client: WebDavClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &WebDavClient {
        &self.client
    }
}

#[async_trait]
impl IRemoteStore for WebDavRemoteStore {
    async fn connect(&self) -> Result<()> {
        self.client
            .propfind(&RemotePath::root())
            .await
            .with_context(|| format!("PROPFIND {} failed", self.client.base_url()))
    }

    async fn ensure_directory(&self, path: &RemotePath) -> Result<()> {
        for dir in path.ancestors_inclusive() {
            let created = self
                .client
                .mkcol(&dir)
                .await
                .with_context(|| format!("Failed to create collection {dir}"))?;
            if created {
                debug!(path = %dir, "Created remote collection");
            }
        }
        Ok(())
    }

    async fn write_stream(&self, path: &RemotePath, source: ByteSource, size: u64) -> Result<()> {
        let body = Body::wrap_stream(ReaderStream::new(source));

        match self.client.put(path, body, size).await {
            Ok(()) => Ok(()),
            Err(WebDavError::Conflict(detail)) => {
                warn!(path = %path, "Parent collection missing, creating it");
                if let Some(parent) = path.parent() {
                    self.ensure_directory(&parent).await?;
                }
                Err(anyhow::anyhow!(
                    "Parent collection was missing ({detail}); created, retry on next run"
                ))
            }
            Err(err) => Err(err).with_context(|| format!("Failed to write {path}")),
        }
    }
}
