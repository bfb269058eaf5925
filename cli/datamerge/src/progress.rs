//! Progress reporting for datamerge.

use dm_cli_common::{format_bytes, format_number};
use dm_worker::MergeStats;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Periodic progress lines on stderr while a merge runs.
pub struct ProgressReporter {
    /// Whether progress reporting is enabled
    enabled: bool,
    /// Reporting interval
    interval: Duration,
    /// Stops the background task
    stop: CancellationToken,
    /// Handle to the background reporter task
    handle: Option<JoinHandle<()>>,
    /// Start time
    start_time: Instant,
}

impl ProgressReporter {
    /// Create a new progress reporter.
    pub fn new(enabled: bool, interval_secs: u64) -> Self {
        Self {
            enabled,
            interval: Duration::from_secs(interval_secs),
            stop: CancellationToken::new(),
            handle: None,
            start_time: Instant::now(),
        }
    }

    /// Start the background progress reporter.
    pub fn start(&mut self, stats: Arc<MergeStats>) {
        if !self.enabled {
            return;
        }

        let stop = self.stop.clone();
        let interval = self.interval;
        let start_time = self.start_time;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick is immediate

            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let _ = writeln!(
                    io::stderr(),
                    "[Progress] {} files read, {} active, {} lines written, {} read ({:.1}s elapsed)",
                    format_number(stats.files_processed()),
                    stats.active_workers(),
                    format_number(stats.lines_written()),
                    format_bytes(stats.bytes_read()),
                    start_time.elapsed().as_secs_f64()
                );
            }
        });

        self.handle = Some(handle);
    }

    /// Stop the progress reporter and print a final line.
    pub async fn stop(mut self, stats: &MergeStats) {
        if !self.enabled {
            return;
        }

        self.stop.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }

        let _ = writeln!(
            io::stderr(),
            "[Progress] Done: {} files read, {} lines written to {} files ({:.1}s)",
            format_number(stats.files_processed()),
            format_number(stats.lines_written()),
            stats.output_files(),
            self.start_time.elapsed().as_secs_f64()
        );
    }
}
