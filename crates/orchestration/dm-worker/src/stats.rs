//! Statistics for merge runs.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache line size on most modern CPUs (64 bytes).
const CACHE_LINE_SIZE: usize = 64;

/// A cache-line-padded atomic counter to prevent false sharing.
///
/// Workers on different threads bump different counters at the same time;
/// keeping each counter on its own cache line keeps those updates from
/// contending with each other.
#[repr(C, align(64))]
#[derive(Debug)]
struct PaddedAtomicU64 {
    value: AtomicU64,
    _padding: [u8; CACHE_LINE_SIZE - std::mem::size_of::<AtomicU64>()],
}

impl Default for PaddedAtomicU64 {
    fn default() -> Self {
        Self::new(0)
    }
}

impl PaddedAtomicU64 {
    fn new(val: u64) -> Self {
        Self {
            value: AtomicU64::new(val),
            _padding: [0; CACHE_LINE_SIZE - std::mem::size_of::<AtomicU64>()],
        }
    }

    #[inline]
    fn load(&self, ordering: Ordering) -> u64 {
        self.value.load(ordering)
    }

    #[inline]
    fn fetch_add(&self, val: u64, ordering: Ordering) -> u64 {
        self.value.fetch_add(val, ordering)
    }

    #[inline]
    fn fetch_sub(&self, val: u64, ordering: Ordering) -> u64 {
        self.value.fetch_sub(val, ordering)
    }

    #[inline]
    fn fetch_max(&self, val: u64, ordering: Ordering) -> u64 {
        self.value.fetch_max(val, ordering)
    }
}

/// Statistics collected during a merge run.
///
/// Shared through `Arc` by the dispatcher, every file worker, and the sink.
#[derive(Debug, Default)]
pub struct MergeStats {
    /// When the run started
    started_at: Option<DateTime<Utc>>,

    /// When the first file started processing
    first_file_at: Mutex<Option<DateTime<Utc>>>,

    /// When the last file finished processing
    last_file_at: Mutex<Option<DateTime<Utc>>>,

    /// Input files read to completion
    files_processed: PaddedAtomicU64,

    /// Input files that failed
    files_failed: PaddedAtomicU64,

    /// Non-blank lines pushed into the queue
    lines_emitted: PaddedAtomicU64,

    /// Blank lines dropped by workers
    blank_lines: PaddedAtomicU64,

    /// Lines accepted by the sink
    lines_written: PaddedAtomicU64,

    /// Bytes read from input files
    bytes_read: PaddedAtomicU64,

    /// Bytes accepted by the sink
    bytes_written: PaddedAtomicU64,

    /// Output files closed by the sink
    output_files: PaddedAtomicU64,

    /// Workers currently running
    active_workers: PaddedAtomicU64,

    /// Highest number of workers observed running at once
    peak_workers: PaddedAtomicU64,
}

impl MergeStats {
    /// Create a new stats tracker with the current time as start time.
    pub fn new() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Record a worker starting on a file.
    pub fn record_worker_started(&self) {
        let now = Utc::now();
        {
            let mut first = self.first_file_at.lock();
            if first.is_none() {
                *first = Some(now);
            }
        }

        let active = self.active_workers.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_workers.fetch_max(active, Ordering::SeqCst);
    }

    /// Record a worker finishing, successfully or not.
    pub fn record_worker_finished(&self) {
        self.active_workers.fetch_sub(1, Ordering::SeqCst);
        *self.last_file_at.lock() = Some(Utc::now());
    }

    /// Record a fully processed input file.
    pub fn record_file_success(&self, lines: u64, blank_lines: u64, bytes_read: u64) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
        self.lines_emitted.fetch_add(lines, Ordering::Relaxed);
        self.blank_lines.fetch_add(blank_lines, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes_read, Ordering::Relaxed);
    }

    /// Record a failed input file.
    pub fn record_file_failure(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a line accepted by the sink.
    pub fn record_line_written(&self, bytes: u64) {
        self.lines_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record output files closed by the sink.
    pub fn record_output_files(&self, count: u64) {
        self.output_files.fetch_add(count, Ordering::Relaxed);
    }

    /// Get the total duration of the run so far.
    pub fn duration(&self) -> Option<Duration> {
        self.started_at.map(|start| Utc::now() - start)
    }

    /// Get the number of files processed.
    pub fn files_processed(&self) -> u64 {
        self.files_processed.load(Ordering::Relaxed)
    }

    /// Get the number of files failed.
    pub fn files_failed(&self) -> u64 {
        self.files_failed.load(Ordering::Relaxed)
    }

    /// Get the number of lines pushed into the queue.
    pub fn lines_emitted(&self) -> u64 {
        self.lines_emitted.load(Ordering::Relaxed)
    }

    /// Get the number of blank lines dropped.
    pub fn blank_lines(&self) -> u64 {
        self.blank_lines.load(Ordering::Relaxed)
    }

    /// Get the number of lines written.
    pub fn lines_written(&self) -> u64 {
        self.lines_written.load(Ordering::Relaxed)
    }

    /// Get the number of bytes read.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }

    /// Get the number of bytes written.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Get the number of output files closed.
    pub fn output_files(&self) -> u64 {
        self.output_files.load(Ordering::Relaxed)
    }

    /// Get the number of workers currently running.
    pub fn active_workers(&self) -> u64 {
        self.active_workers.load(Ordering::SeqCst)
    }

    /// Get the highest number of workers seen running at once.
    pub fn peak_workers(&self) -> u64 {
        self.peak_workers.load(Ordering::SeqCst)
    }

    /// Create a snapshot of the current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            started_at: self.started_at,
            completed_at: None,
            first_file_at: *self.first_file_at.lock(),
            last_file_at: *self.last_file_at.lock(),
            files_processed: self.files_processed(),
            files_failed: self.files_failed(),
            lines_emitted: self.lines_emitted(),
            blank_lines: self.blank_lines(),
            lines_written: self.lines_written(),
            bytes_read: self.bytes_read(),
            bytes_written: self.bytes_written(),
            output_files: self.output_files(),
            peak_workers: self.peak_workers(),
        }
    }
}

/// A serializable snapshot of merge statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// When the first file started processing
    pub first_file_at: Option<DateTime<Utc>>,
    /// When the last file finished processing
    pub last_file_at: Option<DateTime<Utc>>,
    pub files_processed: u64,
    pub files_failed: u64,
    pub lines_emitted: u64,
    pub blank_lines: u64,
    pub lines_written: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub output_files: u64,
    pub peak_workers: u64,
}

impl StatsSnapshot {
    /// Get the total duration of the run (includes startup and drain time).
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Get the active processing duration (first file start to last file end).
    pub fn active_duration(&self) -> Option<Duration> {
        match (self.first_file_at, self.last_file_at) {
            (Some(first), Some(last)) => Some(last - first),
            _ => None,
        }
    }

    /// Lines written per second over the whole run.
    pub fn lines_per_second(&self) -> Option<f64> {
        self.duration().map(|d| {
            let secs = d.num_milliseconds() as f64 / 1000.0;
            if secs > 0.0 {
                self.lines_written as f64 / secs
            } else {
                0.0
            }
        })
    }
}
