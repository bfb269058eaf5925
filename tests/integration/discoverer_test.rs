//! Directory discovery tests over real trees.

use crate::common::{generate_tree, write_input};
use dm_discoverer::{Discoverer, DiscoveryConfig};
use dm_traits::FileSource;
use std::path::Path;
use tempfile::tempdir;

async fn discover(root: &Path, config: DiscoveryConfig) -> Vec<String> {
    let mut discoverer = Discoverer::spawn(root, config);
    let mut names = Vec::new();
    while let Some(file) = discoverer.next_file().await.unwrap() {
        let relative = file.path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/");
        names.push(relative);
    }
    names
}

#[tokio::test]
async fn test_discovers_every_file_in_tree() {
    let root = tempdir().unwrap();
    generate_tree(root.path(), 9, 1);
    write_input(root.path(), ".hidden", "x;1\n");

    let names = discover(root.path(), DiscoveryConfig::new()).await;

    assert_eq!(names.len(), 10);
    assert!(names.contains(&".hidden".to_string()));
    assert!(names.contains(&"part0/file-000.txt".to_string()));
    assert!(names.contains(&"part0/file-008.txt".to_string()));
}

#[cfg(unix)]
#[tokio::test]
async fn test_directory_links_followed_only_when_enabled() {
    let outside = tempdir().unwrap();
    write_input(outside.path(), "linked.txt", "l;1\n");

    let root = tempdir().unwrap();
    write_input(root.path(), "own.txt", "o;1\n");
    std::os::unix::fs::symlink(outside.path(), root.path().join("link")).unwrap();

    let default = discover(root.path(), DiscoveryConfig::new()).await;
    assert_eq!(default, vec!["own.txt"]);

    let followed = discover(root.path(), DiscoveryConfig::new().with_follow_links(true)).await;
    assert_eq!(followed, vec!["link/linked.txt", "own.txt"]);
}
