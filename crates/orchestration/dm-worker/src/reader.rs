//! File worker: reads one input file and feeds its lines into the queue.

use dm_error::{PipelineError, ReaderError, Result};
use dm_transform::{DelimiterPattern, transform_line};
use dm_types::InputFile;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Per-file processing result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileReport {
    /// Lines sent to the queue
    pub lines: u64,

    /// Lines dropped because they were blank after trimming
    pub blank_lines: u64,

    /// Bytes read from the file
    pub bytes_read: u64,
}

/// Reads input files and pushes normalized lines into the shared queue.
///
/// Stateless apart from the shared pattern and the run's cancellation token,
/// so one instance is shared by every spawned worker task.
#[derive(Debug, Clone)]
pub struct FileWorker {
    pattern: Arc<DelimiterPattern>,
    cancel: CancellationToken,
}

impl FileWorker {
    /// Create a worker using `pattern` that gives up once `cancel` fires.
    pub fn new(pattern: Arc<DelimiterPattern>, cancel: CancellationToken) -> Self {
        Self { pattern, cancel }
    }

    /// Process one file to completion.
    ///
    /// The whole file is read into memory, decoded lossily as UTF-8, split on
    /// line breaks, and every non-blank line is normalized and sent in file
    /// order. Sending suspends while the queue is full.
    pub async fn process(&self, file: &InputFile, tx: &mpsc::Sender<String>) -> Result<FileReport> {
        let start = Instant::now();
        debug!(path = %file.path.display(), size = file.size_bytes, "Reading file");

        let data = tokio::fs::read(&file.path)
            .await
            .map_err(|e| ReaderError::from_io(&file.path, &e))?;
        let text = String::from_utf8_lossy(&data);

        let mut report = FileReport {
            bytes_read: data.len() as u64,
            ..Default::default()
        };

        for raw in text.lines() {
            match transform_line(raw, &self.pattern) {
                Some(line) => {
                    self.send(tx, line).await?;
                    report.lines += 1;
                }
                None => report.blank_lines += 1,
            }
        }

        debug!(
            path = %file.path.display(),
            lines = report.lines,
            blank = report.blank_lines,
            duration_ms = start.elapsed().as_millis() as u64,
            "Done reading file"
        );

        Ok(report)
    }

    async fn send(&self, tx: &mpsc::Sender<String>, line: String) -> Result<()> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(PipelineError::Cancelled.into()),
            sent = tx.send(line) => sent.map_err(|_| PipelineError::QueueClosed.into()),
        }
    }
}
