//! Rotating output file sink.

use async_trait::async_trait;
use dm_error::{ConfigError, Result, WriterError};
use dm_traits::{LineSink, OutputFileSummary, SinkReport};
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

/// Name of the `index`-th output file.
pub fn output_file_name(index: u64) -> String {
    format!("output-{}.txt", index)
}

/// An output file currently accepting lines.
struct OpenFile {
    path: PathBuf,
    writer: BufWriter<File>,
    lines: u64,
}

enum SinkState {
    /// No file open; the next line opens `output-<next_index>.txt`.
    Idle,
    /// A file is open and below the step limit.
    Writing(OpenFile),
    /// `finish` was called.
    Flushed,
}

/// Writes lines into `output-0.txt`, `output-1.txt`, ... under a directory,
/// starting a new file every `step` lines.
///
/// Files are created lazily, so no empty file is ever left behind. Existing
/// files with the same names are truncated.
pub struct RotatingFileSink {
    dir: PathBuf,
    step: u64,
    next_index: u64,
    state: SinkState,
    report: SinkReport,
}

impl RotatingFileSink {
    /// Create a sink writing into `dir` with at most `step` lines per file.
    pub fn new(dir: impl Into<PathBuf>, step: usize) -> Result<Self> {
        if step == 0 {
            return Err(ConfigError::InvalidValue {
                field: "step_size",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }

        Ok(Self {
            dir: dir.into(),
            step: step as u64,
            next_index: 0,
            state: SinkState::Idle,
            report: SinkReport::default(),
        })
    }

    async fn open_next(&mut self) -> Result<OpenFile> {
        let path = self.dir.join(output_file_name(self.next_index));
        let file = File::create(&path).await.map_err(|e| WriterError::Create {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.next_index += 1;

        info!(path = %path.display(), "Opened output file");
        Ok(OpenFile {
            path,
            writer: BufWriter::new(file),
            lines: 0,
        })
    }

    async fn close(&mut self, mut open: OpenFile) -> Result<()> {
        open.writer.shutdown().await.map_err(|e| WriterError::Flush {
            path: open.path.display().to_string(),
            message: e.to_string(),
        })?;

        info!(path = %open.path.display(), lines = open.lines, "Closed output file");
        self.report.files.push(OutputFileSummary {
            path: open.path,
            lines: open.lines,
        });
        Ok(())
    }
}

#[async_trait]
impl LineSink for RotatingFileSink {
    async fn write_line(&mut self, line: &str) -> Result<()> {
        let mut open = match std::mem::replace(&mut self.state, SinkState::Idle) {
            SinkState::Writing(open) => open,
            SinkState::Idle => self.open_next().await?,
            SinkState::Flushed => {
                self.state = SinkState::Flushed;
                return Err(WriterError::AlreadyFinished.into());
            }
        };

        let written = async {
            open.writer.write_all(line.as_bytes()).await?;
            open.writer.write_all(b"\n").await
        }
        .await;
        if let Err(e) = written {
            return Err(WriterError::Write {
                path: open.path.display().to_string(),
                message: e.to_string(),
            }
            .into());
        }

        open.lines += 1;
        self.report.lines_written += 1;
        self.report.bytes_written += line.len() as u64 + 1;

        if open.lines >= self.step {
            self.close(open).await?;
        } else {
            self.state = SinkState::Writing(open);
        }
        Ok(())
    }

    async fn finish(&mut self) -> Result<SinkReport> {
        match std::mem::replace(&mut self.state, SinkState::Flushed) {
            SinkState::Writing(open) => self.close(open).await?,
            SinkState::Idle => {}
            SinkState::Flushed => return Err(WriterError::AlreadyFinished.into()),
        }

        debug!(
            files = self.report.file_count(),
            lines = self.report.lines_written,
            "Rotating sink finished"
        );
        Ok(std::mem::take(&mut self.report))
    }
}
