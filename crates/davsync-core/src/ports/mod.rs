//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are interfaces that the sync engine depends on, but whose
//! implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteStore`] - Destination store operations (connect, mkdir, write)
//! - [`ICompletionNotifier`] - Post-run completion signal

pub mod notification;
pub mod remote_store;

pub use notification::{ICompletionNotifier, NotificationOutcome};
pub use remote_store::{ByteSource, IRemoteStore};
