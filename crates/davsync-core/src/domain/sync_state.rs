//! Sync record, run status and the in-progress sync state
//!
//! A [`SyncRecord`] maps a local file path to the modification time (whole
//! seconds since the Unix epoch) that was last transferred successfully.
//! A [`SyncState`] owns one record for the duration of a run together with
//! the [`RunStatus`] that accumulates per-entry outcomes and at most one
//! fatal error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::FatalError;
use super::newtypes::RemotePath;

// ============================================================================
// SyncRecord
// ============================================================================

/// Mapping from local file path to last-synced mtime in seconds
///
/// A key that is present means exactly that mtime was once transferred.
/// Absence means "never synced or unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncRecord {
    entries: HashMap<String, i64>,
}

impl SyncRecord {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded mtime for `path`
    pub fn get(&self, path: &str) -> Option<i64> {
        self.entries.get(path).copied()
    }

    /// True when `path` was last transferred at exactly `mtime`
    pub fn is_in_sync(&self, path: &str, mtime: i64) -> bool {
        self.get(path) == Some(mtime)
    }

    /// Records a successful transfer, replacing any previous mtime
    pub fn insert(&mut self, path: impl Into<String>, mtime: i64) {
        self.entries.insert(path.into(), mtime);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Entries sorted by path
    pub fn sorted(&self) -> Vec<(&str, i64)> {
        let mut out: Vec<_> = self.iter().collect();
        out.sort_unstable_by(|a, b| a.0.cmp(b.0));
        out
    }
}

impl<K: Into<String>> FromIterator<(K, i64)> for SyncRecord {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// ============================================================================
// FileOutcome
// ============================================================================

/// What happened to a single entry during the walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    /// The file was written to the remote store and recorded
    Uploaded {
        local: PathBuf,
        remote: RemotePath,
        mtime: i64,
    },
    /// The recorded mtime matched; nothing was transferred
    Unchanged { local: PathBuf },
    /// An exclude pattern matched the file name
    Excluded { local: PathBuf },
    /// The remote write failed; the record was left stale
    TransferFailed {
        local: PathBuf,
        remote: RemotePath,
        reason: String,
    },
    /// The remote directory could not be created (the walk still descended)
    DirectoryFailed { remote: RemotePath, reason: String },
}

impl FileOutcome {
    /// The local path, when the outcome refers to a file
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            FileOutcome::Uploaded { local, .. }
            | FileOutcome::Unchanged { local }
            | FileOutcome::Excluded { local }
            | FileOutcome::TransferFailed { local, .. } => Some(local),
            FileOutcome::DirectoryFailed { .. } => None,
        }
    }
}

// ============================================================================
// RunStatus
// ============================================================================

/// Aggregated counters for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub uploaded: usize,
    pub unchanged: usize,
    pub excluded: usize,
    pub transfer_failed: usize,
    pub directory_failed: usize,
}

/// Explicit status of a run: at most one fatal error plus per-entry outcomes
#[derive(Debug, Clone, Default)]
pub struct RunStatus {
    fatal: Option<FatalError>,
    outcomes: Vec<FileOutcome>,
}

impl RunStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the run as failed
    ///
    /// Only the first fatal error is kept. Returns `false` when one was
    /// already recorded.
    pub fn fail(&mut self, error: FatalError) -> bool {
        if self.fatal.is_some() {
            return false;
        }
        self.fatal = Some(error);
        true
    }

    pub fn is_failed(&self) -> bool {
        self.fatal.is_some()
    }

    pub fn fatal(&self) -> Option<&FatalError> {
        self.fatal.as_ref()
    }

    pub fn push(&mut self, outcome: FileOutcome) {
        self.outcomes.push(outcome);
    }

    /// Outcomes in the order entries were visited
    pub fn outcomes(&self) -> &[FileOutcome] {
        &self.outcomes
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for outcome in &self.outcomes {
            match outcome {
                FileOutcome::Uploaded { .. } => summary.uploaded += 1,
                FileOutcome::Unchanged { .. } => summary.unchanged += 1,
                FileOutcome::Excluded { .. } => summary.excluded += 1,
                FileOutcome::TransferFailed { .. } => summary.transfer_failed += 1,
                FileOutcome::DirectoryFailed { .. } => summary.directory_failed += 1,
            }
        }
        summary
    }
}

// ============================================================================
// SyncState
// ============================================================================

/// The record being updated by a run plus that run's status
///
/// Created from a loaded record, mutated in place by the walk, persisted in
/// full at the end of the run regardless of outcome, then discarded.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    record: SyncRecord,
    status: RunStatus,
}

impl SyncState {
    pub fn new(record: SyncRecord) -> Self {
        Self {
            record,
            status: RunStatus::new(),
        }
    }

    pub fn record(&self) -> &SyncRecord {
        &self.record
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    /// True when the file at `key` was last transferred with `mtime`
    pub fn is_in_sync(&self, key: &str, mtime: i64) -> bool {
        self.record.is_in_sync(key, mtime)
    }

    /// Records a successful transfer and its outcome
    pub fn mark_uploaded(&mut self, key: &str, local: PathBuf, remote: RemotePath, mtime: i64) {
        self.record.insert(key, mtime);
        self.status.push(FileOutcome::Uploaded {
            local,
            remote,
            mtime,
        });
    }

    /// Records an outcome that does not touch the record
    pub fn note(&mut self, outcome: FileOutcome) {
        debug_assert!(!matches!(outcome, FileOutcome::Uploaded { .. }));
        self.status.push(outcome);
    }

    /// Marks the run as failed; see [`RunStatus::fail`]
    pub fn fail(&mut self, error: FatalError) -> bool {
        self.status.fail(error)
    }

    pub fn is_failed(&self) -> bool {
        self.status.is_failed()
    }

    pub fn into_parts(self) -> (SyncRecord, RunStatus) {
        (self.record, self.status)
    }
}
