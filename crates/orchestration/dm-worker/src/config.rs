//! Configuration types for a merge run.

use dm_error::{ConfigError, Result};
use dm_transform::DEFAULT_DELIMITERS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default maximum number of lines per output file.
pub const DEFAULT_STEP_SIZE: usize = 500_000;

/// Default maximum number of concurrently read input files.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default capacity of the queue between workers and the sink.
pub const DEFAULT_CHANNEL_BUFFER: usize = 1000;

/// Configuration for a merge run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Input root (directory or single file)
    pub input: PathBuf,

    /// Output directory; must already exist
    pub output: PathBuf,

    /// Maximum lines per output file
    pub step_size: usize,

    /// Maximum number of files read in parallel
    pub concurrency: usize,

    /// Candidate delimiter characters
    pub delimiters: String,

    /// Capacity of the bounded line queue
    pub channel_buffer: usize,
}

impl MergeConfig {
    /// Create a configuration for `input` and `output` with defaults for the rest.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            step_size: DEFAULT_STEP_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            delimiters: DEFAULT_DELIMITERS.to_string(),
            channel_buffer: DEFAULT_CHANNEL_BUFFER,
        }
    }

    /// Set the maximum lines per output file.
    pub fn with_step_size(mut self, step: usize) -> Self {
        self.step_size = step;
        self
    }

    /// Set the maximum number of parallel file readers.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the candidate delimiter characters.
    pub fn with_delimiters(mut self, delimiters: impl Into<String>) -> Self {
        self.delimiters = delimiters.into();
        self
    }

    /// Set the line queue capacity.
    pub fn with_channel_buffer(mut self, size: usize) -> Self {
        self.channel_buffer = size;
        self
    }

    /// Validate the configuration against the filesystem.
    pub fn validate(&self) -> Result<()> {
        self.validate_limits()?;
        if !self.output.exists() {
            return Err(ConfigError::OutputNotFound(self.output.display().to_string()).into());
        }
        if !self.output.is_dir() {
            return Err(ConfigError::OutputNotDirectory(self.output.display().to_string()).into());
        }
        if !self.input.exists() {
            return Err(ConfigError::InputNotFound(self.input.display().to_string()).into());
        }
        Ok(())
    }

    /// Validate the numeric limits and delimiter set only.
    pub fn validate_limits(&self) -> Result<()> {
        if self.step_size == 0 {
            return Err(invalid("step_size", "must be at least 1"));
        }
        if self.concurrency == 0 {
            return Err(invalid("concurrency", "must be at least 1"));
        }
        if self.channel_buffer == 0 {
            return Err(invalid("channel_buffer", "must be at least 1"));
        }
        if self.delimiters.is_empty() {
            return Err(ConfigError::InvalidDelimiters(
                "at least one delimiter character is required".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> dm_error::DmError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}
