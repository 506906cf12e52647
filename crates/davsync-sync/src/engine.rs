//! Incremental upload engine
//!
//! The [`SyncEngine`] mirrors a local folder into a remote store, one way,
//! transferring only files whose modification time differs from the one
//! recorded after their last successful transfer.
//!
//! ## Run Flow
//!
//! 1. **Connect**: Verify the remote store; a failure aborts before anything else
//! 2. **Load**: Read the sync record (missing or unreadable means empty)
//! 3. **Walk**: Depth-first over the local folder, mirroring directories and
//!    uploading changed files
//! 4. **Persist**: Rewrite the sync record, always, even after a fatal error
//! 5. **Notify**: Fire the completion notifier when the run did not fail
//!
//! ## Failure Containment
//!
//! A directory that can't be listed, or a file that can't be stat'ed or
//! opened, marks the run failed and abandons the directory being walked.
//! The parent directory carries on with its remaining entries. A failed
//! transfer only leaves that file's record entry untouched.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs::DirEntry;
use tracing::{debug, error, info, warn};

use davsync_core::config::{ConfigLocation, DavConfig};
use davsync_core::domain::{
    FatalError, FileOutcome, RemotePath, RunStatus, RunSummary, SyncRecord, SyncState,
};
use davsync_core::exclude::ExcludeMatcher;
use davsync_core::ports::{ICompletionNotifier, IRemoteStore, NotificationOutcome};

use crate::state_store::StateStore;
use crate::SyncError;

// ============================================================================
// RunReport
// ============================================================================

/// Everything a caller needs to know about a finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Counts per outcome
    pub summary: RunSummary,
    /// First fatal error, if any
    pub fatal: Option<FatalError>,
    /// Per-file outcomes in walk order
    pub outcomes: Vec<FileOutcome>,
    /// Number of entries in the persisted record
    pub record_entries: usize,
    /// Where the record was written
    pub state_path: PathBuf,
    /// Set when the record could not be written
    pub state_error: Option<String>,
    /// What happened to the completion signal
    pub notification: NotificationOutcome,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

impl RunReport {
    /// True when no fatal error occurred during the walk
    pub fn is_success(&self) -> bool {
        self.fatal.is_none()
    }
}

// ============================================================================
// Walk bookkeeping
// ============================================================================

/// A directory being walked, with its entries already listed
struct DirFrame {
    local: PathBuf,
    remote: RemotePath,
    entries: std::vec::IntoIter<DirEntry>,
}

/// What the walker does after visiting one entry
enum Step {
    /// Move on to the next entry of the current directory
    Next,
    /// Walk into a subdirectory before continuing here
    Descend(DirFrame),
    /// Abandon the rest of the current directory
    Abandon,
}

/// Lists a directory completely, failing if any entry can't be read
///
/// An empty path lists the current directory.
async fn list_directory(dir: &Path) -> std::io::Result<Vec<DirEntry>> {
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        entries.push(entry);
    }
    Ok(entries)
}

/// Cleans the local root lexically, the form record keys are built from
///
/// Drops `.` components along with repeated and trailing separators, and
/// lets `..` cancel the name before it. The current directory cleans to an
/// empty path so its files are keyed by bare name (`a.txt`, not `./a.txt`).
fn clean_root(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

/// Converts a modification time to whole seconds since the Unix epoch
fn unix_seconds(time: SystemTime) -> i64 {
    DateTime::<Utc>::from(time).timestamp()
}

// ============================================================================
// SyncEngine
// ============================================================================

/// One-way folder-to-remote upload engine
pub struct SyncEngine {
    remote: Arc<dyn IRemoteStore>,
    notifier: Option<Arc<dyn ICompletionNotifier>>,
    matcher: ExcludeMatcher,
    remote_root: RemotePath,
}

impl SyncEngine {
    /// Creates a new engine for `config`
    ///
    /// # Errors
    /// Returns [`SyncError::DomainError`] when `RootPath` is not a usable
    /// remote path.
    pub fn new(remote: Arc<dyn IRemoteStore>, config: &DavConfig) -> Result<Self, SyncError> {
        Ok(Self {
            remote,
            notifier: None,
            matcher: ExcludeMatcher::new(config.exclude.as_slice()),
            remote_root: config.remote_root()?,
        })
    }

    /// Attaches the completion notifier fired after a successful run
    pub fn with_notifier(mut self, notifier: Arc<dyn ICompletionNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn remote_root(&self) -> &RemotePath {
        &self.remote_root
    }

    /// Performs one full run for the folder described by `location`
    ///
    /// # Errors
    /// Only a failed connect is returned as an error. Everything that goes
    /// wrong after that is part of the returned [`RunReport`].
    #[tracing::instrument(skip(self, location), fields(root = %location.local_root().display()))]
    pub async fn run(&self, location: &ConfigLocation) -> Result<RunReport, SyncError> {
        let started = Instant::now();

        // Step 1: connect
        if let Err(err) = self.remote.connect().await {
            let reason = format!("{err:#}");
            error!(%reason, "Can't connect to server");
            return Err(SyncError::Connection(reason));
        }
        info!(remote_root = %self.remote_root, "Connected to remote store");

        // Step 2: load the record
        let store = StateStore::new(location.state_path());
        let record = store.load().await;

        // Step 3: walk
        let mut state = SyncState::new(record);
        self.walk(location.local_root(), &mut state).await;
        let (record, status) = state.into_parts();

        // Step 4: persist, regardless of how the walk ended
        let state_error = match store.save(&record).await {
            Ok(()) => None,
            Err(err) => {
                error!(%err, "Sync record not saved");
                Some(err.to_string())
            }
        };

        // Step 5: notify
        if let Some(fatal) = status.fatal() {
            error!(%fatal, "Sync failed");
        }
        let notification = self.notify(&status).await;

        let summary = status.summary();
        let duration_ms = started.elapsed().as_millis() as u64;
        info!(
            uploaded = summary.uploaded,
            unchanged = summary.unchanged,
            excluded = summary.excluded,
            transfer_failed = summary.transfer_failed,
            directory_failed = summary.directory_failed,
            failed = status.is_failed(),
            duration_ms,
            "Sync run complete"
        );

        Ok(RunReport {
            summary,
            fatal: status.fatal().cloned(),
            outcomes: status.outcomes().to_vec(),
            record_entries: record.len(),
            state_path: store.path().to_path_buf(),
            state_error,
            notification,
            duration_ms,
        })
    }

    /// Walks `local_root`, updating `state` for every entry visited
    ///
    /// Record keys are built from the lexically cleaned root, so `./site/`
    /// and `site` produce the same keys.
    ///
    /// Entries of one directory are visited in the order the OS lists them;
    /// a subdirectory is fully processed before its parent's next entry.
    pub async fn walk(&self, local_root: &Path, state: &mut SyncState) {
        if !self.remote_root.is_root() {
            self.ensure_remote_directory(&self.remote_root, state).await;
        }

        let mut stack: Vec<DirFrame> = Vec::new();
        if let Some(frame) = self
            .open_directory(clean_root(local_root), self.remote_root.clone(), state)
            .await
        {
            stack.push(frame);
        }

        while let Some(frame) = stack.last_mut() {
            let Some(entry) = frame.entries.next() else {
                stack.pop();
                continue;
            };

            let file_name = entry.file_name();
            let name = file_name.to_string_lossy().into_owned();
            if ConfigLocation::is_bookkeeping(&name) {
                continue;
            }

            let local = frame.local.join(&file_name);
            let remote = match frame.remote.join(&name) {
                Ok(remote) => remote,
                Err(err) => {
                    warn!(path = %local.display(), %err, "Skipping entry with unusable name");
                    continue;
                }
            };

            match self.visit(entry, &name, local, remote, state).await {
                Step::Next => {}
                Step::Descend(child) => stack.push(child),
                Step::Abandon => {
                    stack.pop();
                }
            }
        }
    }

    /// Lists `local`, or records a fatal error when it can't be listed
    async fn open_directory(
        &self,
        local: PathBuf,
        remote: RemotePath,
        state: &mut SyncState,
    ) -> Option<DirFrame> {
        match list_directory(&local).await {
            Ok(entries) => {
                debug!(path = %local.display(), entries = entries.len(), "Walking directory");
                Some(DirFrame {
                    local,
                    remote,
                    entries: entries.into_iter(),
                })
            }
            Err(err) => {
                error!(path = %local.display(), %err, "Can't read directory");
                state.fail(FatalError::ListDirectory {
                    path: local,
                    reason: err.to_string(),
                });
                None
            }
        }
    }

    async fn visit(
        &self,
        entry: DirEntry,
        name: &str,
        local: PathBuf,
        remote: RemotePath,
        state: &mut SyncState,
    ) -> Step {
        // file_type does not follow symlinks
        let file_type = match entry.file_type().await {
            Ok(file_type) => file_type,
            Err(err) => return Self::abandon(local, err, state),
        };

        if file_type.is_dir() {
            self.ensure_remote_directory(&remote, state).await;
            return match self.open_directory(local, remote, state).await {
                Some(child) => Step::Descend(child),
                None => Step::Next,
            };
        }

        self.sync_file(name, local, remote, state).await
    }

    /// Mirrors a directory remotely; a failure is recorded but not fatal
    async fn ensure_remote_directory(&self, remote: &RemotePath, state: &mut SyncState) {
        if let Err(err) = self.remote.ensure_directory(remote).await {
            let reason = format!("{err:#}");
            warn!(remote = %remote, %reason, "Can't create remote folder");
            state.note(FileOutcome::DirectoryFailed {
                remote: remote.clone(),
                reason,
            });
        }
    }

    async fn sync_file(
        &self,
        name: &str,
        local: PathBuf,
        remote: RemotePath,
        state: &mut SyncState,
    ) -> Step {
        if let Some(pattern) = self.matcher.matching_pattern(name) {
            info!(path = %local.display(), pattern, "Excluded");
            state.note(FileOutcome::Excluded { local });
            return Step::Next;
        }

        let metadata = match tokio::fs::metadata(&local).await {
            Ok(metadata) => metadata,
            Err(err) => return Self::abandon(local, err, state),
        };
        if metadata.is_dir() {
            warn!(path = %local.display(), "Not following symlink to directory");
            return Step::Next;
        }
        let mtime = match metadata.modified() {
            Ok(time) => unix_seconds(time),
            Err(err) => return Self::abandon(local, err, state),
        };

        let key = local.to_string_lossy().into_owned();
        if state.is_in_sync(&key, mtime) {
            debug!(path = %key, "Unchanged");
            state.note(FileOutcome::Unchanged { local });
            return Step::Next;
        }

        let file = match tokio::fs::File::open(&local).await {
            Ok(file) => file,
            Err(err) => return Self::abandon(local, err, state),
        };

        match self
            .remote
            .write_stream(&remote, Box::new(file), metadata.len())
            .await
        {
            Ok(()) => {
                info!(path = %key, remote = %remote, bytes = metadata.len(), "Uploaded");
                state.mark_uploaded(&key, local, remote, mtime);
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(path = %key, remote = %remote, %reason, "Upload failed");
                state.note(FileOutcome::TransferFailed {
                    local,
                    remote,
                    reason,
                });
            }
        }
        Step::Next
    }

    fn abandon(local: PathBuf, err: std::io::Error, state: &mut SyncState) -> Step {
        error!(path = %local.display(), %err, "Can't access file, abandoning directory");
        state.fail(FatalError::FileAccess {
            path: local,
            reason: err.to_string(),
        });
        Step::Abandon
    }

    async fn notify(&self, status: &RunStatus) -> NotificationOutcome {
        let Some(notifier) = &self.notifier else {
            return NotificationOutcome::NotConfigured;
        };
        if status.is_failed() {
            return NotificationOutcome::Skipped;
        }

        match notifier.notify_completion().await {
            Ok(()) => {
                info!("Completion notification sent");
                NotificationOutcome::Sent
            }
            Err(err) => {
                let reason = format!("{err:#}");
                error!(%reason, "Completion notification failed");
                NotificationOutcome::Failed(reason)
            }
        }
    }
}

/// Loads the record for `location` without running anything
pub async fn load_record(location: &ConfigLocation) -> SyncRecord {
    StateStore::new(location.state_path()).load().await
}
