//! Main execution logic for datamerge CLI.

use anyhow::Result;
use dm_discoverer::{Discoverer, DiscoveryConfig};
use dm_worker::{create_destination, MergeConfig, MergePipeline, StatsSnapshot};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

use crate::args::{Cli, DestinationArg};
use crate::progress::ProgressReporter;

/// What the binary reports once a merge succeeds.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub destination: &'static str,
    pub step: usize,
    pub concurrency: usize,
    pub stats: StatsSnapshot,
}

/// Build the merge configuration from parsed arguments.
pub fn merge_config(args: &Cli) -> MergeConfig {
    MergeConfig::new(&args.input, &args.output)
        .with_step_size(args.step)
        .with_concurrency(args.concurrency)
        .with_delimiters(args.delimiters.as_str())
        .with_channel_buffer(args.channel_buffer)
}

/// Execute a merge with the provided arguments.
pub async fn execute(args: Cli) -> Result<RunSummary> {
    let config = merge_config(&args);
    config.validate()?;

    let discovery = DiscoveryConfig::new().with_follow_links(args.follow_links);
    let source = Discoverer::spawn(&config.input, discovery);
    let sink = create_destination(args.destination.into(), &config.output, config.step_size)?;

    let pipeline = MergePipeline::new(config.clone(), source, sink);
    let stats = Arc::clone(pipeline.stats());

    let mut progress = ProgressReporter::new(args.progress, args.progress_interval);
    progress.start(Arc::clone(&stats));

    let cancel = pipeline.cancel_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling merge");
            cancel.cancel();
        }
    });

    let result = pipeline.run().await;
    interrupt.abort();
    progress.stop(&stats).await;

    Ok(RunSummary {
        input: config.input,
        output: config.output,
        destination: match args.destination {
            DestinationArg::Files => "files",
            DestinationArg::Stats => "stats",
        },
        step: config.step_size,
        concurrency: config.concurrency,
        stats: result?,
    })
}
