//! Line sink trait and related types.

use async_trait::async_trait;
use dm_error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Trait for the consumer at the end of the merge pipeline.
///
/// A sink is owned by exactly one task and receives lines strictly in
/// dequeue order, so implementations need no internal locking.
///
/// # Implementations
///
/// - Rotating file sink: `output-N.txt` files capped at a line count
/// - Stats sink: counts lines without writing (dry runs)
#[async_trait]
pub trait LineSink: Send {
    /// Writes one normalized line. The sink appends the line terminator.
    async fn write_line(&mut self, line: &str) -> Result<()>;

    /// Flushes and closes any open output and returns the final report.
    ///
    /// After `finish` the sink rejects further writes.
    async fn finish(&mut self) -> Result<SinkReport>;
}

#[async_trait]
impl<T: LineSink + ?Sized> LineSink for Box<T> {
    async fn write_line(&mut self, line: &str) -> Result<()> {
        (**self).write_line(line).await
    }

    async fn finish(&mut self) -> Result<SinkReport> {
        (**self).finish().await
    }
}

/// Summary of a single closed output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFileSummary {
    /// Path of the output file
    pub path: PathBuf,

    /// Number of lines written to it
    pub lines: u64,
}

/// Result of a completed sink.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SinkReport {
    /// Output files in creation order (empty for sinks that write nothing)
    pub files: Vec<OutputFileSummary>,

    /// Total lines accepted
    pub lines_written: u64,

    /// Total bytes accepted, including line terminators
    pub bytes_written: u64,
}

impl SinkReport {
    /// Number of output files produced.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}
