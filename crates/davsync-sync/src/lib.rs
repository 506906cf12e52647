//! davsync Sync - Incremental upload engine
//!
//! Provides:
//! - Depth-first walk of a local folder with per-file change detection
//! - Partial-failure containment (per directory) with an explicit run status
//! - The persisted sync record (`<config>.result`)
//!
//! ## Modules
//!
//! - [`engine`] - Sync engine orchestrating connect, walk, persist, notify
//! - [`state_store`] - Line-oriented sync record file with `EOF` sentinel

pub mod engine;
pub mod state_store;

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a sync run or its bookkeeping
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote store rejected or could not be reached on connect
    #[error("Can't connect to server: {0}")]
    Connection(String),

    /// The sync record could not be written
    #[error("Failed to save sync record to {}: {source}", path.display())]
    StateSave {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A domain-level error propagated from davsync-core
    #[error("Domain error: {0}")]
    DomainError(#[from] davsync_core::domain::errors::DomainError),
}
