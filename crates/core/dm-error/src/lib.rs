//! Error types for datamerge.
//!
//! This crate provides:
//! - [`DmError`] - Top-level error enum for all pipeline errors
//! - Domain-specific errors ([`ConfigError`], [`DiscoveryError`], [`ReaderError`],
//!   [`WriterError`], [`PipelineError`])
//!
//! Every error is fatal for the run. There is no retry tier: a merge that did
//! not complete cannot be told apart from a good one, so callers abort and
//! report instead of continuing.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Top-level error type for datamerge.
#[derive(Error, Debug)]
pub enum DmError {
    /// Invalid options, detected before any work starts
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input tree traversal errors
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Input file read errors
    #[error("Reader error: {0}")]
    Reader(#[from] ReaderError),

    /// Output file create/write errors
    #[error("Writer error: {0}")]
    Writer(#[from] WriterError),

    /// Coordination errors (closed queue, cancellation, task failure)
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DmError {
    /// Whether this error only reports that the run was cancelled because of
    /// an earlier failure elsewhere.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, DmError::Pipeline(PipelineError::Cancelled))
    }

    /// Whether this error only reports that the output queue went away,
    /// which happens after the consumer has already failed.
    pub fn is_queue_closed(&self) -> bool {
        matches!(self, DmError::Pipeline(PipelineError::QueueClosed))
    }
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Input root does not exist
    #[error("input path {0} does not exist")]
    InputNotFound(String),

    /// Output directory does not exist
    #[error("output directory {0} does not exist")]
    OutputNotFound(String),

    /// Output path exists but is not a directory
    #[error("output path {0} is not a directory")]
    OutputNotDirectory(String),

    /// Delimiter set is empty or cannot be compiled
    #[error("invalid delimiters: {0}")]
    InvalidDelimiters(String),

    /// A numeric or other option is out of range
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

/// Input traversal errors.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Directory walk failed (unreadable directory, loop, ...)
    #[error("Walk failed at {path}: {message}")]
    Walk { path: String, message: String },

    /// Metadata lookup for an entry failed
    #[error("Metadata failed for {path}: {message}")]
    Metadata { path: String, message: String },
}

/// Input file read errors.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// File not found
    #[error("File not found: {0}")]
    NotFound(String),

    /// Access denied
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Any other I/O error during read
    #[error("I/O error: {0}")]
    Io(String),
}

impl ReaderError {
    /// Map an I/O error for `path` onto the matching reader error.
    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        let path = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => ReaderError::NotFound(path),
            io::ErrorKind::PermissionDenied => ReaderError::AccessDenied(path),
            _ => ReaderError::Io(format!("Failed to read '{}': {}", path, err)),
        }
    }
}

/// Output file errors.
#[derive(Error, Debug)]
pub enum WriterError {
    /// Output file could not be created
    #[error("Failed to create {path}: {message}")]
    Create { path: String, message: String },

    /// Write to an open output file failed
    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    /// Flush/close of an output file failed
    #[error("Failed to flush {path}: {message}")]
    Flush { path: String, message: String },

    /// Line submitted after the sink was finished
    #[error("Sink already finished")]
    AlreadyFinished,
}

/// Pipeline coordination errors.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The output queue was closed while a worker was still sending
    #[error("Output queue closed")]
    QueueClosed,

    /// The run was cancelled after a failure elsewhere
    #[error("Cancelled")]
    Cancelled,

    /// A spawned task panicked or was aborted
    #[error("Task failed: {0}")]
    TaskFailed(String),
}

/// Result type alias using DmError.
pub type Result<T> = std::result::Result<T, DmError>;
