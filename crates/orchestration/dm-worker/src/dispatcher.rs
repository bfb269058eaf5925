//! Dispatcher: runs one file worker per input file under a concurrency cap.

use crate::reader::{FileReport, FileWorker};
use crate::stats::MergeStats;
use dm_error::{DmError, PipelineError, Result};
use dm_traits::FileSource;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Outcome of a dispatch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Files handed to a worker
    pub files_dispatched: u64,

    /// Files whose worker finished successfully
    pub files_completed: u64,
}

/// Pulls files from a [`FileSource`] and runs a [`FileWorker`] for each,
/// with at most `concurrency` workers alive at any time.
pub struct Dispatcher {
    concurrency: usize,
    worker: Arc<FileWorker>,
    stats: Arc<MergeStats>,
    cancel: CancellationToken,
}

impl Dispatcher {
    /// Create a dispatcher.
    ///
    /// `concurrency` is clamped to at least 1.
    pub fn new(
        concurrency: usize,
        worker: FileWorker,
        stats: Arc<MergeStats>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            concurrency: concurrency.max(1),
            worker: Arc::new(worker),
            stats,
            cancel,
        }
    }

    /// Dispatch every file from `source`, then wait for all workers.
    ///
    /// `tx` is consumed: once this returns, the only senders left are the
    /// caller's own clones, so the consumer sees the queue close as soon as
    /// those are dropped.
    ///
    /// The first traversal or worker failure cancels the run; no new workers
    /// start, running ones stop at their next send, and every spawned worker
    /// is joined before returning that failure. A run cancelled from outside
    /// with no other failure returns [`PipelineError::Cancelled`].
    pub async fn run<S>(&self, source: &mut S, tx: mpsc::Sender<String>) -> Result<DispatchReport>
    where
        S: FileSource + ?Sized,
    {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<Result<FileReport>> = JoinSet::new();
        let mut report = DispatchReport::default();
        let mut failure: Option<DmError> = None;

        info!(concurrency = self.concurrency, "Dispatching input files");

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                next = source.next_file() => next,
            };

            let file = match next {
                Ok(Some(file)) => file,
                Ok(None) => break,
                Err(e) => {
                    debug!(error = %e, "Input traversal failed");
                    self.cancel.cancel();
                    keep_first(&mut failure, e);
                    break;
                }
            };

            // Suspends while all slots are taken.
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(e) => {
                        self.cancel.cancel();
                        keep_first(&mut failure, PipelineError::TaskFailed(e.to_string()).into());
                        break;
                    }
                },
            };

            debug!(path = %file.path.display(), size = file.size_bytes, "Dispatching file");

            let worker = Arc::clone(&self.worker);
            let stats = Arc::clone(&self.stats);
            let cancel = self.cancel.clone();
            let tx = tx.clone();

            tasks.spawn(async move {
                // Released on every exit path when the task ends.
                let _permit = permit;

                stats.record_worker_started();
                let result = worker.process(&file, &tx).await;
                stats.record_worker_finished();

                match &result {
                    Ok(file_report) => stats.record_file_success(
                        file_report.lines,
                        file_report.blank_lines,
                        file_report.bytes_read,
                    ),
                    // A closed queue or a cancellation points at a failure
                    // elsewhere, not at this file.
                    Err(e) if e.is_cancellation() => {}
                    Err(e) if e.is_queue_closed() => cancel.cancel(),
                    Err(e) => {
                        stats.record_file_failure();
                        debug!(path = %file.path.display(), error = %e, "Failed to process file");
                        cancel.cancel();
                    }
                }
                result
            });
            report.files_dispatched += 1;

            while let Some(joined) = tasks.try_join_next() {
                self.collect(joined, &mut report, &mut failure);
            }
        }

        drop(tx);

        debug!(in_flight = tasks.len(), "Traversal finished, waiting for workers");
        while let Some(joined) = tasks.join_next().await {
            self.collect(joined, &mut report, &mut failure);
        }

        if failure.is_none() && self.cancel.is_cancelled() {
            failure = Some(PipelineError::Cancelled.into());
        }

        match failure {
            Some(e) => Err(e),
            None => {
                info!(files = report.files_completed, "All workers finished");
                Ok(report)
            }
        }
    }

    fn collect(
        &self,
        joined: std::result::Result<Result<FileReport>, JoinError>,
        report: &mut DispatchReport,
        failure: &mut Option<DmError>,
    ) {
        match joined {
            Ok(Ok(_)) => report.files_completed += 1,
            Ok(Err(e)) => keep_first(failure, e),
            Err(e) => {
                debug!(error = %e, "Worker task failed");
                self.cancel.cancel();
                keep_first(failure, PipelineError::TaskFailed(e.to_string()).into());
            }
        }
    }
}

/// Keep the first failure, letting a real error replace a cancellation.
fn keep_first(slot: &mut Option<DmError>, err: DmError) {
    let replace = match slot {
        None => true,
        Some(existing) => existing.is_cancellation() && !err.is_cancellation(),
    };
    if replace {
        *slot = Some(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dm_error::{DiscoveryError, ReaderError};
    use dm_traits::ListSource;
    use dm_transform::{DelimiterPattern, DEFAULT_DELIMITERS};
    use dm_types::InputFile;
    use std::path::Path;
    use tempfile::tempdir;

    fn dispatcher(concurrency: usize) -> (Dispatcher, Arc<MergeStats>, CancellationToken) {
        let pattern = Arc::new(DelimiterPattern::new(DEFAULT_DELIMITERS).unwrap());
        let cancel = CancellationToken::new();
        let stats = Arc::new(MergeStats::new());
        let worker = FileWorker::new(pattern, cancel.clone());
        (
            Dispatcher::new(concurrency, worker, Arc::clone(&stats), cancel.clone()),
            stats,
            cancel,
        )
    }

    fn write_files(dir: &Path, count: usize, lines_per_file: usize) -> Vec<InputFile> {
        (0..count)
            .map(|f| {
                let path = dir.join(format!("in-{}.txt", f));
                let body: String = (0..lines_per_file)
                    .map(|l| format!("f{}l{};v\n", f, l))
                    .collect();
                std::fs::write(&path, &body).unwrap();
                InputFile::new(path, body.len() as u64)
            })
            .collect()
    }

    async fn run_and_collect(
        dispatcher: &Dispatcher,
        mut source: ListSource,
        buffer: usize,
    ) -> (Result<DispatchReport>, Vec<String>) {
        let (tx, mut rx) = mpsc::channel(buffer);
        let consumer = tokio::spawn(async move {
            let mut lines = Vec::new();
            while let Some(line) = rx.recv().await {
                lines.push(line);
            }
            lines
        });

        let result = dispatcher.run(&mut source, tx).await;
        let lines = consumer.await.unwrap();
        (result, lines)
    }

    /// Source that yields its files and then fails.
    struct FailingSource {
        files: ListSource,
    }

    #[async_trait]
    impl FileSource for FailingSource {
        async fn next_file(&mut self) -> Result<Option<InputFile>> {
            match self.files.next_file().await? {
                Some(file) => Ok(Some(file)),
                None => Err(DiscoveryError::Walk {
                    path: "in/locked".to_string(),
                    message: "permission denied".to_string(),
                }
                .into()),
            }
        }
    }

    #[tokio::test]
    async fn test_dispatch_all_files() {
        let dir = tempdir().unwrap();
        let files = write_files(dir.path(), 5, 20);
        let (dispatcher, stats, _) = dispatcher(3);

        let (result, lines) = run_and_collect(&dispatcher, ListSource::new(files), 8).await;

        let report = result.unwrap();
        assert_eq!(report.files_dispatched, 5);
        assert_eq!(report.files_completed, 5);
        assert_eq!(lines.len(), 100);
        assert!(lines.iter().all(|l| l.ends_with(":v")));
        assert_eq!(stats.files_processed(), 5);
        assert_eq!(stats.lines_emitted(), 100);
        assert_eq!(stats.active_workers(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_ceiling() {
        let dir = tempdir().unwrap();
        let files = write_files(dir.path(), 12, 200);
        let (dispatcher, stats, _) = dispatcher(2);

        // A one-slot queue keeps workers parked on send so they overlap.
        let (result, lines) = run_and_collect(&dispatcher, ListSource::new(files), 1).await;

        result.unwrap();
        assert_eq!(lines.len(), 12 * 200);
        assert!(stats.peak_workers() >= 1);
        assert!(stats.peak_workers() <= 2);
    }

    #[tokio::test]
    async fn test_per_file_order_preserved() {
        let dir = tempdir().unwrap();
        let files = write_files(dir.path(), 4, 50);
        let (dispatcher, _, _) = dispatcher(4);

        let (result, lines) = run_and_collect(&dispatcher, ListSource::new(files), 2).await;
        result.unwrap();

        for f in 0..4 {
            let prefix = format!("f{}l", f);
            let of_file: Vec<&String> = lines.iter().filter(|l| l.starts_with(&prefix)).collect();
            let expected: Vec<String> = (0..50).map(|l| format!("f{}l{}:v", f, l)).collect();
            assert_eq!(of_file.len(), 50);
            assert!(of_file.iter().zip(&expected).all(|(a, b)| *a == b));
        }
    }

    #[tokio::test]
    async fn test_missing_file_fails_run() {
        let dir = tempdir().unwrap();
        let mut files = write_files(dir.path(), 3, 10);
        files.insert(1, InputFile::new(dir.path().join("vanished.txt"), 10));
        let (dispatcher, stats, cancel) = dispatcher(1);

        let (result, _) = run_and_collect(&dispatcher, ListSource::new(files), 4).await;

        match result {
            Err(DmError::Reader(ReaderError::NotFound(path))) => {
                assert!(path.ends_with("vanished.txt"));
            }
            other => panic!("Expected NotFound, got: {:?}", other),
        }
        assert!(cancel.is_cancelled());
        assert!(stats.files_failed() >= 1);
        assert_eq!(stats.active_workers(), 0);
    }

    #[tokio::test]
    async fn test_traversal_error_fails_run_after_joining() {
        let dir = tempdir().unwrap();
        let files = write_files(dir.path(), 2, 10);
        let (dispatcher, stats, _) = dispatcher(2);

        let (tx, mut rx) = mpsc::channel(64);
        let mut source = FailingSource {
            files: ListSource::new(files),
        };
        let result = dispatcher.run(&mut source, tx).await;

        assert!(matches!(
            result,
            Err(DmError::Discovery(DiscoveryError::Walk { .. }))
        ));
        // Nothing is left running once run returns.
        assert_eq!(stats.active_workers(), 0);
        let mut drained = 0;
        while rx.recv().await.is_some() {
            drained += 1;
        }
        assert!(drained <= 20);
    }

    #[tokio::test]
    async fn test_closed_queue_fails_run() {
        let dir = tempdir().unwrap();
        let files = write_files(dir.path(), 2, 10);
        let (dispatcher, stats, _) = dispatcher(2);

        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut source = ListSource::new(files);
        let result = dispatcher.run(&mut source, tx).await;

        assert!(matches!(
            result,
            Err(DmError::Pipeline(PipelineError::QueueClosed))
        ));
        // The readable inputs are not blamed for the dead consumer.
        assert_eq!(stats.files_failed(), 0);
        assert_eq!(stats.files_processed(), 0);
    }

    #[tokio::test]
    async fn test_empty_source() {
        let (dispatcher, stats, _) = dispatcher(4);

        let (result, lines) = run_and_collect(&dispatcher, ListSource::default(), 1).await;

        assert_eq!(result.unwrap(), DispatchReport::default());
        assert!(lines.is_empty());
        assert_eq!(stats.peak_workers(), 0);
    }

    #[tokio::test]
    async fn test_external_cancel() {
        let dir = tempdir().unwrap();
        let files = write_files(dir.path(), 3, 5);
        let (dispatcher, stats, cancel) = dispatcher(2);
        cancel.cancel();

        let (result, lines) = run_and_collect(&dispatcher, ListSource::new(files), 4).await;

        assert!(result.unwrap_err().is_cancellation());
        assert!(lines.is_empty());
        assert_eq!(stats.files_processed(), 0);
    }

    #[test]
    fn test_keep_first_prefers_real_errors() {
        let mut slot = None;
        keep_first(&mut slot, PipelineError::Cancelled.into());
        keep_first(&mut slot, ReaderError::NotFound("a".into()).into());
        keep_first(&mut slot, PipelineError::QueueClosed.into());

        assert!(matches!(slot, Some(DmError::Reader(ReaderError::NotFound(_)))));
    }
}
