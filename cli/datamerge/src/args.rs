//! CLI argument definitions for datamerge.

use clap::{Parser, ValueEnum};
use dm_cli_common::parse_positive_usize;
pub use dm_cli_common::LogLevel;
use std::path::PathBuf;

/// Merge a tree of text files into size-capped output files.
///
/// Every file under the input root is read, blank lines are dropped, the
/// first delimiter on each line is rewritten to ':', and the lines are
/// written to output-0.txt, output-1.txt, ... with at most STEP lines each.
/// Line order across input files is not preserved.
///
/// ## Examples
///
/// Merge with defaults:
///   datamerge -i ./dumps -o ./merged
///
/// Smaller output files, fewer parallel readers:
///   datamerge -i ./dumps -o ./merged -s 100000 -c 4
///
/// Count lines without writing anything:
///   datamerge -i ./dumps -o ./merged -d stats --summary-format json
#[derive(Parser, Debug)]
#[command(name = "datamerge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    // === Paths ===
    /// Input root (directory or single file)
    #[arg(short = 'i', long, env = "DATAMERGE_INPUT")]
    pub input: PathBuf,

    /// Output directory (must already exist)
    #[arg(short = 'o', long, env = "DATAMERGE_OUTPUT")]
    pub output: PathBuf,

    // === Processing ===
    /// Maximum lines per output file (must be >= 1)
    #[arg(short = 's', long, default_value = "500000", value_parser = parse_positive_usize)]
    pub step: usize,

    /// Maximum number of files read in parallel (must be >= 1)
    #[arg(short = 'c', long, default_value = "10", value_parser = parse_positive_usize)]
    pub concurrency: usize,

    /// Candidate delimiter characters; the first one found on a line becomes ':'
    #[arg(long, default_value = ":|;")]
    pub delimiters: String,

    /// Capacity of the line queue between readers and the writer (must be >= 1)
    #[arg(long, default_value = "1000", value_parser = parse_positive_usize)]
    pub channel_buffer: usize,

    /// Follow symbolic links to directories while walking the input
    #[arg(long)]
    pub follow_links: bool,

    // === Destination ===
    /// Output destination type
    #[arg(short = 'd', long, value_enum, default_value = "files")]
    pub destination: DestinationArg,

    /// Rendering of the final summary on stderr
    #[arg(long, value_enum, default_value = "text")]
    pub summary_format: SummaryFormat,

    // === Progress Options ===
    /// Enable progress reporting to stderr
    #[arg(long)]
    pub progress: bool,

    /// Progress reporting interval in seconds
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
    pub progress_interval: u64,

    // === Logging ===
    /// Log level
    #[arg(short = 'l', long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

/// Destination type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DestinationArg {
    /// Write rotating output-N.txt files
    Files,
    /// Count lines without writing (dry run)
    Stats,
}

impl From<DestinationArg> for dm_worker::DestinationType {
    fn from(arg: DestinationArg) -> Self {
        match arg {
            DestinationArg::Files => dm_worker::DestinationType::Files,
            DestinationArg::Stats => dm_worker::DestinationType::Stats,
        }
    }
}

/// Summary format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    /// Human-readable lines
    Text,
    /// One JSON document
    Json,
}
