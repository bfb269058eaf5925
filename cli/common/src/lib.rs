//! Shared utilities for the datamerge CLI.
//!
//! Logging setup, the log-level argument, and number/byte formatting used by
//! the summary and progress output.

pub mod args;
pub mod format;
pub mod logging;

pub use args::{parse_positive_usize, LogLevel};
pub use format::{format_bytes, format_duration, format_number};
pub use logging::init_logging;
