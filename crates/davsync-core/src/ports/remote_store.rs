//! Remote store port (driven/secondary port)
//!
//! This module defines the capability the sync engine needs from the
//! destination store: connect, make sure a directory exists, and write a
//! byte stream to a path. The shipped implementation speaks WebDAV
//! (`davsync-webdav`), but the engine only sees this trait.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are
//!   adapter-specific; the engine turns them into typed outcomes.
//! - `write_stream` takes ownership of the reader, so the local file
//!   handle is dropped when the call returns, whatever the result.

use tokio::io::AsyncRead;

use crate::domain::newtypes::RemotePath;

/// Byte source handed to [`IRemoteStore::write_stream`]
pub type ByteSource = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// Port trait for the destination store
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Verifies that the store is reachable and the credentials are accepted
    ///
    /// A failure aborts the run before anything is walked.
    async fn connect(&self) -> anyhow::Result<()>;

    /// Creates `path` and any missing ancestors
    ///
    /// Must succeed when the directory already exists.
    async fn ensure_directory(&self, path: &RemotePath) -> anyhow::Result<()>;

    /// Writes the whole of `source` to `path`, replacing existing content
    ///
    /// # Arguments
    /// * `path` - Destination resource
    /// * `source` - The bytes to write
    /// * `size` - Number of bytes `source` will yield
    async fn write_stream(
        &self,
        path: &RemotePath,
        source: ByteSource,
        size: u64,
    ) -> anyhow::Result<()>;
}
