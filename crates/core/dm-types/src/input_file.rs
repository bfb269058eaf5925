//! Input file descriptor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A file discovered under the input root.
///
/// Carries only metadata; the size is used for logging and read statistics.
/// Each `InputFile` is handed to exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFile {
    /// Path to the file
    pub path: PathBuf,

    /// Size of the file in bytes at discovery time
    pub size_bytes: u64,
}

impl InputFile {
    /// Create a new input file descriptor.
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            size_bytes,
        }
    }
}

impl fmt::Display for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.path.display(), self.size_bytes)
    }
}
