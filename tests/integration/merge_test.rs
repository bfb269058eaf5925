//! End-to-end merge tests over real directories.

use crate::common::{generate_tree, merged_lines, read_outputs, run_merge, write_input};
use dm_error::{ConfigError, DmError};
use tempfile::tempdir;

#[tokio::test]
async fn test_single_file_scenario() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_input(input.path(), "in.txt", "a:1\n  \nb;2\nc\n");

    let stats = run_merge(input.path(), output.path(), 2, 1).await.unwrap();

    assert_eq!(
        read_outputs(output.path()),
        vec![
            ("output-0.txt".to_string(), vec!["a:1".to_string(), "b:2".to_string()]),
            ("output-1.txt".to_string(), vec!["c".to_string()]),
        ]
    );
    assert_eq!(stats.lines_written, 3);
    assert_eq!(stats.blank_lines, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_line_written_once_and_normalized() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    let total = generate_tree(input.path(), 10, 123);

    let stats = run_merge(input.path(), output.path(), 100, 4).await.unwrap();

    let lines = merged_lines(output.path());
    assert_eq!(lines.len(), total);
    assert_eq!(stats.lines_written as usize, total);
    assert_eq!(stats.files_processed, 10);

    let mut deduped = lines.clone();
    deduped.dedup();
    assert_eq!(deduped.len(), total);

    for line in &lines {
        let (key, value) = line.split_once(':').unwrap();
        assert!(key.starts_with("key"));
        assert!(value.starts_with("value "));
        assert!(!line.contains('|') && !line.contains(';'));
    }
}

#[tokio::test]
async fn test_rotation_counts() {
    for step in [1, 4, 10, 30, 31] {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let total = generate_tree(input.path(), 3, 10);

        let stats = run_merge(input.path(), output.path(), step, 2).await.unwrap();

        let outputs = read_outputs(output.path());
        let expected_files = total.div_ceil(step);
        assert_eq!(outputs.len(), expected_files, "step {}", step);
        assert_eq!(stats.output_files as usize, expected_files);

        let (last, full) = outputs.split_last().unwrap();
        assert!(full.iter().all(|(_, lines)| lines.len() == step), "step {}", step);
        let remainder = match total % step {
            0 => step,
            r => r,
        };
        assert_eq!(last.1.len(), remainder, "step {}", step);

        for (i, (name, _)) in outputs.iter().enumerate() {
            assert_eq!(name, &format!("output-{}.txt", i));
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_does_not_change_contents() {
    let input = tempdir().unwrap();
    generate_tree(input.path(), 16, 64);

    let serial = tempdir().unwrap();
    let parallel = tempdir().unwrap();
    run_merge(input.path(), serial.path(), 50, 1).await.unwrap();
    run_merge(input.path(), parallel.path(), 50, 16).await.unwrap();

    assert_eq!(merged_lines(serial.path()), merged_lines(parallel.path()));
    assert_eq!(
        read_outputs(serial.path()).len(),
        read_outputs(parallel.path()).len()
    );
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    generate_tree(input.path(), 5, 20);

    run_merge(input.path(), output.path(), 30, 3).await.unwrap();
    let first = merged_lines(output.path());
    let first_files = read_outputs(output.path()).len();

    run_merge(input.path(), output.path(), 30, 3).await.unwrap();

    assert_eq!(merged_lines(output.path()), first);
    assert_eq!(read_outputs(output.path()).len(), first_files);
}

#[tokio::test]
async fn test_empty_and_blank_inputs_create_no_files() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_input(input.path(), "empty.txt", "");
    write_input(input.path(), "nested/blank.txt", "\n   \n\t\n");

    let stats = run_merge(input.path(), output.path(), 10, 2).await.unwrap();

    assert!(read_outputs(output.path()).is_empty());
    assert_eq!(stats.files_processed, 2);
    assert_eq!(stats.blank_lines, 3);
    assert_eq!(stats.output_files, 0);
}

#[tokio::test]
async fn test_missing_output_directory_is_rejected() {
    let input = tempdir().unwrap();
    write_input(input.path(), "a.txt", "a;1\n");
    let missing = input.path().join("no-such-dir");

    let result = run_merge(input.path(), &missing, 10, 2).await;

    assert!(matches!(
        result,
        Err(DmError::Config(ConfigError::OutputNotFound(_)))
    ));
}
