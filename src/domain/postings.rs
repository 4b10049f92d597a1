//! Posting Log
//!
//! Time-ordered log of sent notifications, persisted as a whole-file JSON
//! array. The gate reads it in full on every check; appends rewrite the
//! file. Entries older than the retention window are dropped on append so
//! the file stays bounded.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default posting log file name
pub const DEFAULT_POSTING_LOG_FILE: &str = "messages.json";

#[derive(Debug, Error)]
pub enum PostingLogError {
    #[error("Failed to serialize posting log: {0}")]
    SerializationError(String),

    #[error("Failed to write posting log: {0}")]
    WriteError(String),
}

/// One sent notification, used only for throttle decisions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingEntry {
    pub address: String,
    pub posted_at: DateTime<Utc>,
}

/// File-backed append-only posting log
#[derive(Debug, Clone)]
pub struct PostingLog {
    path: PathBuf,
    /// Entries older than this are dropped on append; must be at least the
    /// longest cooldown the gate enforces
    retention: Duration,
}

impl PostingLog {
    pub fn new(path: impl Into<PathBuf>, retention: Duration) -> Self {
        Self {
            path: path.into(),
            retention,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all entries. Missing or unreadable files are treated as an
    /// empty log (fail-open, may cause a duplicate notification).
    pub fn load(&self) -> Vec<PostingEntry> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read posting log {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    "Posting log {:?} is corrupted, treating as empty: {}",
                    self.path,
                    e
                );
                Vec::new()
            }
        }
    }

    /// Append one entry, dropping entries outside the retention window,
    /// and rewrite the file
    pub fn append(&self, address: &str, now: DateTime<Utc>) -> Result<(), PostingLogError> {
        let mut entries = self.load();
        entries.retain(|e| now - e.posted_at <= self.retention);
        entries.push(PostingEntry {
            address: address.to_string(),
            posted_at: now,
        });

        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| PostingLogError::SerializationError(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| PostingLogError::WriteError(e.to_string()))?;

        tracing::debug!("Recorded posting for {} at {}", address, now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn log_in(dir: &TempDir) -> PostingLog {
        PostingLog::new(
            dir.path().join(DEFAULT_POSTING_LOG_FILE),
            Duration::minutes(3),
        )
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(log_in(&dir).load().is_empty());
    }

    #[test]
    fn test_append_then_load() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        let now = Utc::now();

        log.append("MintA", now).unwrap();
        log.append("MintB", now).unwrap();

        let entries = log.load();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].address, "MintA");
        assert_eq!(entries[1].address, "MintB");
    }

    #[test]
    fn test_corrupted_file_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        fs::write(log.path(), "not json at all").unwrap();
        assert!(log.load().is_empty());
    }

    #[test]
    fn test_append_prunes_stale_entries() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        let now = Utc::now();

        log.append("Old", now - Duration::minutes(10)).unwrap();
        log.append("Fresh", now).unwrap();

        let entries = log.load();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].address, "Fresh");
    }
}
