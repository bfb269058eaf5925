//! Pipeline coordinator: wires the source, workers, queue and sink together.

use crate::config::MergeConfig;
use crate::destination::drain;
use crate::dispatcher::Dispatcher;
use crate::reader::FileWorker;
use crate::stats::{MergeStats, StatsSnapshot};
use chrono::Utc;
use dm_error::{PipelineError, Result};
use dm_traits::{FileSource, LineSink, SinkReport};
use dm_transform::DelimiterPattern;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// One merge run from a file source into a line sink.
///
/// The sink runs on its own task and is started before any worker. Workers
/// are dispatched from the calling task, and the sink task's handle is the
/// completion signal: it resolves only after every sender is gone and the
/// queue is empty.
pub struct MergePipeline<S, K> {
    config: MergeConfig,
    source: S,
    sink: K,
    stats: Arc<MergeStats>,
    cancel: CancellationToken,
}

impl<S: FileSource, K: LineSink + 'static> MergePipeline<S, K> {
    /// Create a pipeline. Nothing runs until [`run`](Self::run).
    pub fn new(config: MergeConfig, source: S, sink: K) -> Self {
        Self {
            config,
            source,
            sink,
            stats: Arc::new(MergeStats::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// Live statistics, for progress reporting while `run` is in flight.
    pub fn stats(&self) -> &Arc<MergeStats> {
        &self.stats
    }

    /// Token that aborts the run when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run to completion.
    ///
    /// A sink failure takes precedence over a dispatch failure, since it is
    /// what makes producers see a closed queue.
    pub async fn run(self) -> Result<StatsSnapshot> {
        let Self {
            config,
            mut source,
            mut sink,
            stats,
            cancel,
        } = self;

        config.validate_limits()?;
        let pattern = Arc::new(DelimiterPattern::new(&config.delimiters)?);

        info!(
            input = %config.input.display(),
            output = %config.output.display(),
            step = config.step_size,
            concurrency = config.concurrency,
            delimiters = ?pattern.delimiters(),
            "Starting merge"
        );

        let (tx, rx) = mpsc::channel(config.channel_buffer);

        let sink_stats = Arc::clone(&stats);
        let sink_handle = tokio::spawn(async move { drain(rx, &mut sink, &sink_stats).await });

        let dispatcher = Dispatcher::new(
            config.concurrency,
            FileWorker::new(pattern, cancel.clone()),
            Arc::clone(&stats),
            cancel.clone(),
        );
        let dispatched = dispatcher.run(&mut source, tx).await;

        let sunk: Result<SinkReport> = match sink_handle.await {
            Ok(result) => result,
            Err(e) => Err(PipelineError::TaskFailed(format!("sink task: {}", e)).into()),
        };

        let report = match (sunk, dispatched) {
            (Err(e), _) => {
                debug!(error = %e, "Output sink failed");
                return Err(e);
            }
            (Ok(_), Err(e)) => {
                debug!(error = %e, "Merge aborted");
                return Err(e);
            }
            (Ok(report), Ok(_)) => report,
        };

        let mut snapshot = stats.snapshot();
        snapshot.completed_at = Some(Utc::now());

        info!(
            files = snapshot.files_processed,
            lines = report.lines_written,
            output_files = report.file_count(),
            "Merge complete"
        );
        Ok(snapshot)
    }
}
