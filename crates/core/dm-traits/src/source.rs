//! File source trait and an in-memory implementation.

use async_trait::async_trait;
use dm_error::Result;
use dm_types::InputFile;
use std::collections::VecDeque;

/// Trait for producers of input files.
///
/// Implementations include:
/// - Directory walker (production)
/// - In-memory list (for testing/development)
///
/// Each file is yielded exactly once. An `Err` is fatal for the run; callers
/// stop pulling after the first error.
#[async_trait]
pub trait FileSource: Send {
    /// Returns the next file, or `None` once the source is exhausted.
    async fn next_file(&mut self) -> Result<Option<InputFile>>;
}

/// File source backed by a fixed list of files.
#[derive(Debug, Default)]
pub struct ListSource {
    files: VecDeque<InputFile>,
}

impl ListSource {
    /// Create a source yielding `files` in order.
    pub fn new(files: impl IntoIterator<Item = InputFile>) -> Self {
        Self {
            files: files.into_iter().collect(),
        }
    }
}

#[async_trait]
impl FileSource for ListSource {
    async fn next_file(&mut self) -> Result<Option<InputFile>> {
        Ok(self.files.pop_front())
    }
}
