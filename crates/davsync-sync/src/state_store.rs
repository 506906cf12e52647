//! Sync record persistence
//!
//! The record file is plain text, one `<localPath> | <mtimeSeconds>` line
//! per synced file, terminated by a literal `EOF` line:
//!
//! ```text
//! /data/site/index.html | 1700000000
//! /data/site/css/main.css | 1700000123
//! EOF
//! ```
//!
//! Reading stops at the sentinel; lines that do not split or whose integer
//! does not parse are skipped. Writes go to a temporary sibling that is
//! renamed over the destination.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use davsync_core::domain::SyncRecord;
use tracing::{debug, info, instrument};

use crate::SyncError;

/// Sentinel line terminating a record file
pub const SENTINEL: &str = "EOF";

/// Separator between path and mtime on each line
pub const SEPARATOR: &str = " | ";

/// Reads and writes the sync record at a fixed path
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the record; an unreadable file yields an empty record
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> SyncRecord {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let record = parse_record(&String::from_utf8_lossy(&bytes));
                debug!(entries = record.len(), "Loaded sync record");
                record
            }
            Err(err) => {
                if err.kind() == ErrorKind::NotFound {
                    info!("No sync record yet, uploading everything");
                } else {
                    info!(error = %err, "Can't open sync record, uploading everything");
                }
                SyncRecord::new()
            }
        }
    }

    /// Replaces the file with `record` followed by the sentinel
    #[instrument(skip(self, record), fields(path = %self.path.display(), entries = record.len()))]
    pub async fn save(&self, record: &SyncRecord) -> Result<(), SyncError> {
        let content = render_record(record);

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let result = async {
            tokio::fs::write(&tmp, content.as_bytes()).await?;
            tokio::fs::rename(&tmp, &self.path).await
        }
        .await;

        if let Err(source) = result {
            // Best effort: don't leave the temporary behind
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(SyncError::StateSave {
                path: self.path.clone(),
                source,
            });
        }

        debug!("Saved sync record");
        Ok(())
    }
}

/// Parses record text, stopping at the sentinel
pub fn parse_record(text: &str) -> SyncRecord {
    let mut record = SyncRecord::new();
    for line in text.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line == SENTINEL {
            break;
        }
        let Some((path, mtime)) = line.rsplit_once(SEPARATOR) else {
            continue;
        };
        if let Ok(mtime) = mtime.trim().parse::<i64>() {
            record.insert(path, mtime);
        }
    }
    record
}

/// Renders a record as file content, sorted by path, ending with the sentinel
pub fn render_record(record: &SyncRecord) -> String {
    let mut out = String::new();
    for (path, mtime) in record.sorted() {
        out.push_str(path);
        out.push_str(SEPARATOR);
        out.push_str(&mtime.to_string());
        out.push('\n');
    }
    out.push_str(SENTINEL);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic() {
        let record = parse_record("/d/a.txt | 100\n/d/b.txt | 200\nEOF");
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("/d/a.txt"), Some(100));
        assert_eq!(record.get("/d/b.txt"), Some(200));
    }

    #[test]
    fn parse_stops_at_sentinel() {
        let record = parse_record("/d/a.txt | 1\nEOF\n/d/late.txt | 2\n");
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("/d/late.txt"), None);
    }

    #[test]
    fn parse_skips_malformed_lines() {
        let text = "garbage\n/d/a.txt | notanumber\n/d/b.txt|3\n\n/d/c.txt | 4\nEOF";
        let record = parse_record(text);
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("/d/c.txt"), Some(4));
    }

    #[test]
    fn parse_without_sentinel_reads_everything() {
        let record = parse_record("/d/a.txt | 1\n/d/b.txt | 2\n");
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn parse_negative_and_crlf() {
        let record = parse_record("/d/old.txt | -5\r\nEOF\r\n");
        assert_eq!(record.get("/d/old.txt"), Some(-5));
    }

    #[test]
    fn parse_splits_on_last_separator() {
        let record = parse_record("/d/a | b.txt | 7\nEOF");
        assert_eq!(record.get("/d/a | b.txt"), Some(7));
    }

    #[test]
    fn render_ends_with_sentinel() {
        assert_eq!(render_record(&SyncRecord::new()), "EOF");

        let record: SyncRecord = [("/d/b", 2), ("/d/a", 1)].into_iter().collect();
        assert_eq!(render_record(&record), "/d/a | 1\n/d/b | 2\nEOF");
    }

    #[test]
    fn render_then_parse_is_identity() {
        let record: SyncRecord = [
            ("/d/a.txt", 1_700_000_000),
            ("/d/sub/b c.txt", 0),
            ("/d/x | y", -1),
        ]
        .into_iter()
        .collect();
        assert_eq!(parse_record(&render_record(&record)), record);
    }

    #[tokio::test]
    async fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join(".tk.webdav.result"));
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join(".tk.webdav.result"));
        let record: SyncRecord = [("/d/a.txt", 10), ("/d/b.txt", 20)].into_iter().collect();

        store.save(&record).await.unwrap();
        assert_eq!(store.load().await, record);

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.ends_with("EOF"));
        assert!(!dir.path().join(".tk.webdav.result.tmp").exists());
    }

    #[tokio::test]
    async fn save_overwrites_completely() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".tk.webdav.result");
        std::fs::write(&path, "/d/stale.txt | 1\n/d/other.txt | 2\nEOF\ntrailing junk").unwrap();

        let store = StateStore::new(&path);
        let record: SyncRecord = [("/d/new.txt", 3)].into_iter().collect();
        store.save(&record).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "/d/new.txt | 3\nEOF");
    }

    #[tokio::test]
    async fn save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("nope").join(".tk.webdav.result"));
        let err = store.save(&SyncRecord::new()).await.unwrap_err();
        assert!(matches!(err, SyncError::StateSave { .. }));
    }
}
