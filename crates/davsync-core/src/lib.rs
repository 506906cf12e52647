//! davsync Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `SyncRecord`, `SyncState`, `RunStatus`, `RemotePath`
//! - **Exclude matching** - `ExcludeMatcher` over configured filename patterns
//! - **Port definitions** - Traits for adapters: `IRemoteStore`, `ICompletionNotifier`
//! - **Configuration** - the per-folder JSON config and its on-disk location
//!
//! # Architecture
//!
//! The domain module contains pure data and rules with no I/O.
//! Ports define trait interfaces that adapter crates implement; the sync
//! engine in `davsync-sync` drives them.

pub mod config;
pub mod domain;
pub mod exclude;
pub mod ports;
