//! Statistics for discovery runs.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Statistics collected by the walk thread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryStats {
    /// When the walk started
    pub started_at: Option<DateTime<Utc>>,

    /// When the walk completed
    pub completed_at: Option<DateTime<Utc>>,

    /// Regular files handed to the consumer
    pub files_found: u64,

    /// Total bytes of those files
    pub bytes_found: u64,

    /// Directories visited
    pub directories: u64,

    /// Entries that are neither directories nor regular files
    pub entries_skipped: u64,
}

impl DiscoveryStats {
    /// Create a new stats tracker with the current time as start time.
    pub fn new() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Mark the walk as complete with the current time.
    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Record a discovered regular file.
    pub fn record_file(&mut self, size_bytes: u64) {
        self.files_found += 1;
        self.bytes_found += size_bytes;
    }

    /// Record a visited directory.
    pub fn record_directory(&mut self) {
        self.directories += 1;
    }

    /// Record a skipped entry (socket, fifo, dangling link target, ...).
    pub fn record_skipped(&mut self) {
        self.entries_skipped += 1;
    }

    /// Get the duration of the walk.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}
