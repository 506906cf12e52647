//! Domain entities and business logic
//!
//! This module contains the core domain types for davsync:
//! - Remote path newtype
//! - Sync record, run status and in-progress sync state
//! - Domain-specific error types

pub mod errors;
pub mod newtypes;
pub mod sync_state;

// Re-export commonly used types
pub use errors::{DomainError, FatalError};
pub use newtypes::RemotePath;
pub use sync_state::{FileOutcome, RunStatus, RunSummary, SyncRecord, SyncState};
