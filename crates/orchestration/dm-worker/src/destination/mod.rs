//! Output destinations and the single consumer loop that feeds them.

mod rotating;
mod stats;

pub use rotating::{output_file_name, RotatingFileSink};
pub use stats::StatsSink;

use crate::stats::MergeStats;
use dm_error::Result;
use dm_traits::{LineSink, SinkReport};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Destination type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DestinationType {
    /// Rotating `output-N.txt` files
    #[default]
    Files,
    /// Count lines only, write nothing
    Stats,
}

/// Create a destination sink for `dir`.
pub fn create_destination(
    dest_type: DestinationType,
    dir: &Path,
    step: usize,
) -> Result<Box<dyn LineSink>> {
    match dest_type {
        DestinationType::Files => Ok(Box::new(RotatingFileSink::new(dir, step)?)),
        DestinationType::Stats => Ok(Box::new(StatsSink::new())),
    }
}

/// Consume lines from `rx` until every sender is gone and the queue is empty,
/// then finish the sink.
///
/// On a sink error the receiver is dropped on return, so producers still
/// blocked on the queue see it closed.
pub async fn drain<K>(
    mut rx: mpsc::Receiver<String>,
    sink: &mut K,
    stats: &MergeStats,
) -> Result<SinkReport>
where
    K: LineSink + ?Sized,
{
    info!("Starting file writer");

    while let Some(line) = rx.recv().await {
        sink.write_line(&line).await?;
        stats.record_line_written(line.len() as u64 + 1);
    }

    debug!("Queue closed, finishing sink");
    let report = sink.finish().await?;
    stats.record_output_files(report.file_count() as u64);

    info!(
        files = report.file_count(),
        lines = report.lines_written,
        "Done writing"
    );
    Ok(report)
}
