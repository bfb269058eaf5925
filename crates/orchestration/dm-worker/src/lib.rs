//! dm-worker - concurrent merge pipeline for datamerge.
//!
//! This crate turns a stream of input files into size-capped output files:
//!
//! - Bounded pool of file workers (at most `concurrency` reading at once)
//! - One shared bounded queue between workers and the writer (backpressure)
//! - Single sequential sink that rotates `output-N.txt` every `step` lines
//! - Fail-fast: the first failure cancels the run and is returned
//!
//! # Example
//!
//! ```ignore
//! use dm_discoverer::{Discoverer, DiscoveryConfig};
//! use dm_worker::{MergeConfig, MergePipeline, RotatingFileSink};
//!
//! let config = MergeConfig::new("/data/in", "/data/out")
//!     .with_step_size(100_000)
//!     .with_concurrency(8);
//! config.validate()?;
//!
//! let source = Discoverer::spawn(&config.input, DiscoveryConfig::new());
//! let sink = RotatingFileSink::new(&config.output, config.step_size)?;
//!
//! let stats = MergePipeline::new(config, source, sink).run().await?;
//! eprintln!("Wrote {} lines to {} files", stats.lines_written, stats.output_files);
//! ```

pub mod config;
pub mod coordinator;
pub mod destination;
pub mod dispatcher;
pub mod reader;
pub mod stats;

pub use config::MergeConfig;
pub use coordinator::MergePipeline;
pub use destination::{
    create_destination, drain, output_file_name, DestinationType, RotatingFileSink, StatsSink,
};
pub use dispatcher::{DispatchReport, Dispatcher};
pub use reader::{FileReport, FileWorker};
pub use stats::{MergeStats, StatsSnapshot};
