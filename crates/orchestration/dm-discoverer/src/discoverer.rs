//! Directory walk exposed as a [`FileSource`].

use async_trait::async_trait;
use dm_error::{DiscoveryError, DmError, PipelineError, Result};
use dm_traits::FileSource;
use dm_types::InputFile;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};
use walkdir::{DirEntry, WalkDir};

use crate::config::DiscoveryConfig;
use crate::stats::DiscoveryStats;

/// Recursive walker over an input root.
///
/// Directories are descended into, regular files are yielded, everything
/// else is skipped. The first traversal error is yielded as an `Err` and ends
/// the walk.
pub struct Discoverer {
    rx: mpsc::Receiver<Result<InputFile>>,
    handle: Option<JoinHandle<DiscoveryStats>>,
    stats: Option<DiscoveryStats>,
}

impl Discoverer {
    /// Start walking `root` on a blocking thread.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(root: impl Into<PathBuf>, config: DiscoveryConfig) -> Self {
        let root = root.into();
        let (tx, rx) = mpsc::channel(config.channel_buffer.max(1));

        info!(
            root = %root.display(),
            follow_links = config.follow_links,
            "Starting discovery"
        );

        let handle = tokio::task::spawn_blocking(move || walk(&root, &config, &tx));

        Self {
            rx,
            handle: Some(handle),
            stats: None,
        }
    }

    /// Walk statistics, available once the source is exhausted.
    pub fn stats(&self) -> Option<&DiscoveryStats> {
        self.stats.as_ref()
    }

    /// Join the walk thread after the channel closed.
    async fn join_walk(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        let stats = handle
            .await
            .map_err(|e| DmError::from(PipelineError::TaskFailed(format!("discovery walk: {}", e))))?;

        debug!(
            files = stats.files_found,
            bytes = stats.bytes_found,
            directories = stats.directories,
            skipped = stats.entries_skipped,
            "Discovery completed"
        );
        self.stats = Some(stats);
        Ok(())
    }
}

#[async_trait]
impl FileSource for Discoverer {
    async fn next_file(&mut self) -> Result<Option<InputFile>> {
        match self.rx.recv().await {
            Some(Ok(file)) => Ok(Some(file)),
            Some(Err(e)) => Err(e),
            None => {
                // A panicked walk closes the channel too; surface it rather
                // than report a silently truncated file list.
                self.join_walk().await?;
                Ok(None)
            }
        }
    }
}

/// Blocking walk loop. Returns when the tree is exhausted, on the first
/// error, or when the consumer goes away.
fn walk(root: &Path, config: &DiscoveryConfig, tx: &mpsc::Sender<Result<InputFile>>) -> DiscoveryStats {
    let mut stats = DiscoveryStats::new();

    let mut walker = WalkDir::new(root).follow_links(config.follow_links);
    if config.sort_entries {
        walker = walker.sort_by_file_name();
    }

    for entry in walker {
        let item = match entry {
            Ok(entry) => match classify(&entry, &mut stats) {
                Ok(Some(file)) => Ok(file),
                Ok(None) => continue,
                Err(e) => Err(e),
            },
            Err(e) => {
                let path = e
                    .path()
                    .unwrap_or(root)
                    .display()
                    .to_string();
                Err(DiscoveryError::Walk {
                    path,
                    message: e.to_string(),
                }
                .into())
            }
        };

        let failed = item.is_err();
        if tx.blocking_send(item).is_err() {
            debug!("Discovery consumer dropped, stopping walk");
            break;
        }
        if failed {
            break;
        }
    }

    stats.complete();
    stats
}

/// Turn a walk entry into an input file, or `None` for entries that are not
/// dispatched.
fn classify(entry: &DirEntry, stats: &mut DiscoveryStats) -> Result<Option<InputFile>> {
    if entry.file_type().is_dir() {
        stats.record_directory();
        return Ok(None);
    }

    // Follows symlinks: a link to a regular file is dispatched like the file.
    let metadata = std::fs::metadata(entry.path()).map_err(|e| DiscoveryError::Metadata {
        path: entry.path().display().to_string(),
        message: e.to_string(),
    })?;

    if !metadata.is_file() {
        trace!(path = %entry.path().display(), "Skipping non-regular entry");
        stats.record_skipped();
        return Ok(None);
    }

    let file = InputFile::new(entry.path(), metadata.len());
    stats.record_file(file.size_bytes);
    debug!(path = %file.path.display(), size = file.size_bytes, "Discovered file");
    Ok(Some(file))
}
