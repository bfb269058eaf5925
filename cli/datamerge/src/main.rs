//! datamerge CLI
//!
//! Merges a tree of text files into size-capped output files.

use clap::Parser;
use dm_cli_common::{format_bytes, format_duration, format_number, init_logging};
use std::io::{self, Write};
use std::time::{Duration, Instant};

mod args;
mod progress;
mod run;

use args::{Cli, SummaryFormat};
use run::RunSummary;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    init_logging(args.log_level)?;

    let start = Instant::now();
    let summary_format = args.summary_format;
    let result = run::execute(args).await;

    // Reported on every exit, independent of the log filter.
    let mut stderr = io::stderr().lock();
    write_elapsed(&mut stderr, start.elapsed())?;

    match result {
        Ok(summary) => {
            write_summary(&mut stderr, &summary, summary_format)?;
            Ok(())
        }
        Err(e) => {
            writeln!(stderr, "Error: {}", e)?;
            drop(stderr);
            std::process::exit(1);
        }
    }
}

fn write_elapsed(out: &mut impl Write, elapsed: Duration) -> io::Result<()> {
    writeln!(out, "datamerge took {}", format_duration(elapsed))
}

fn write_summary(
    out: &mut impl Write,
    summary: &RunSummary,
    format: SummaryFormat,
) -> anyhow::Result<()> {
    if format == SummaryFormat::Json {
        writeln!(out, "{}", serde_json::to_string_pretty(summary)?)?;
        return Ok(());
    }

    let stats = &summary.stats;

    writeln!(out)?;
    writeln!(out, "Merge completed:")?;
    writeln!(out, "  Input:           {}", summary.input.display())?;
    writeln!(out, "  Output:          {} ({})", summary.output.display(), summary.destination)?;
    writeln!(out, "  Files processed: {}", format_number(stats.files_processed))?;
    writeln!(out, "  Lines written:   {}", format_number(stats.lines_written))?;
    writeln!(out, "  Blank skipped:   {}", format_number(stats.blank_lines))?;
    writeln!(out, "  Output files:    {}", stats.output_files)?;
    writeln!(out, "  Bytes read:      {}", format_bytes(stats.bytes_read))?;
    writeln!(out, "  Bytes written:   {}", format_bytes(stats.bytes_written))?;
    writeln!(out, "  Peak readers:    {} of {}", stats.peak_workers, summary.concurrency)?;

    if let Some(duration) = stats.duration() {
        let secs = duration.num_milliseconds() as f64 / 1000.0;
        writeln!(out, "  Duration:        {:.2}s", secs)?;

        if let Some(active) = stats.active_duration() {
            let active_secs = active.num_milliseconds() as f64 / 1000.0;
            writeln!(out, "  Active reading:  {:.2}s", active_secs)?;
        }

        if let Some(lps) = stats.lines_per_second() {
            if lps > 0.0 {
                writeln!(out, "  Throughput:      {} lines/sec", format_number(lps as u64))?;
            }
        }

        if secs > 0.0 {
            let throughput_mbps = (stats.bytes_read as f64 / 1_000_000.0) / secs;
            if throughput_mbps >= 0.1 {
                writeln!(out, "                   {:.1} MB/s read", throughput_mbps)?;
            }
        }
    }

    Ok(())
}
