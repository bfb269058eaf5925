//! Common utilities for integration tests.

use dm_discoverer::{Discoverer, DiscoveryConfig};
use dm_error::Result;
use dm_worker::{MergeConfig, MergePipeline, RotatingFileSink, StatsSnapshot};
use std::fs;
use std::path::Path;

/// Write `contents` to `root/relative`, creating parent directories.
pub fn write_input(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Build `files` input files of `lines` lines each, spread over a few
/// subdirectories. Every line is unique and uses one of `:`, `|` or `;`.
pub fn generate_tree(root: &Path, files: usize, lines: usize) -> usize {
    let delimiters = [':', '|', ';'];
    for f in 0..files {
        let body: String = (0..lines)
            .map(|l| format!("key{}-{}{}value {}\n", f, l, delimiters[(f + l) % 3], l))
            .collect();
        write_input(root, &format!("part{}/file-{:03}.txt", f % 4, f), &body);
    }
    files * lines
}

/// Run the full pipeline from `input` into `output`.
pub async fn run_merge(
    input: &Path,
    output: &Path,
    step: usize,
    concurrency: usize,
) -> Result<StatsSnapshot> {
    let config = MergeConfig::new(input, output)
        .with_step_size(step)
        .with_concurrency(concurrency);
    config.validate()?;

    let source = Discoverer::spawn(input, DiscoveryConfig::new());
    let sink = RotatingFileSink::new(output, step)?;
    MergePipeline::new(config, source, sink).run().await
}

/// Output files as (name, lines), sorted by file index.
pub fn read_outputs(dir: &Path) -> Vec<(String, Vec<String>)> {
    let mut outputs: Vec<(u64, String, Vec<String>)> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let path = entry.unwrap().path();
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            let index = name
                .trim_start_matches("output-")
                .trim_end_matches(".txt")
                .parse()
                .unwrap();
            let lines = fs::read_to_string(&path)
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect();
            (index, name, lines)
        })
        .collect();
    outputs.sort_by_key(|(index, _, _)| *index);
    outputs.into_iter().map(|(_, name, lines)| (name, lines)).collect()
}

/// All output lines, sorted.
pub fn merged_lines(dir: &Path) -> Vec<String> {
    let mut lines: Vec<String> = read_outputs(dir)
        .into_iter()
        .flat_map(|(_, lines)| lines)
        .collect();
    lines.sort();
    lines
}
