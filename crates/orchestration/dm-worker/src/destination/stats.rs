//! Stats destination implementation.

use async_trait::async_trait;
use dm_error::{Result, WriterError};
use dm_traits::{LineSink, SinkReport};

/// Sink that counts lines and bytes without writing anything.
///
/// Used for dry runs and throughput measurement.
#[derive(Debug, Default)]
pub struct StatsSink {
    lines: u64,
    bytes: u64,
    finished: bool,
}

impl StatsSink {
    /// Create a new stats sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines counted so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }
}

#[async_trait]
impl LineSink for StatsSink {
    async fn write_line(&mut self, line: &str) -> Result<()> {
        if self.finished {
            return Err(WriterError::AlreadyFinished.into());
        }
        self.lines += 1;
        self.bytes += line.len() as u64 + 1;
        Ok(())
    }

    async fn finish(&mut self) -> Result<SinkReport> {
        if self.finished {
            return Err(WriterError::AlreadyFinished.into());
        }
        self.finished = true;
        Ok(SinkReport {
            files: Vec::new(),
            lines_written: self.lines,
            bytes_written: self.bytes,
        })
    }
}
