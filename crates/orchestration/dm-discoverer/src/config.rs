//! Configuration types for the discoverer.

use serde::{Deserialize, Serialize};

/// Configuration for a discovery run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Follow symbolic links to directories while walking
    pub follow_links: bool,

    /// Visit directory entries in file-name order
    pub sort_entries: bool,

    /// Capacity of the hand-off channel between the walk and its consumer
    pub channel_buffer: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            follow_links: false,
            sort_entries: true,
            channel_buffer: 64,
        }
    }
}

impl DiscoveryConfig {
    /// Create a new discovery configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow symbolic links to directories.
    pub fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Visit entries in file-name order.
    pub fn with_sort_entries(mut self, sort: bool) -> Self {
        self.sort_entries = sort;
        self
    }

    /// Set the hand-off channel capacity (minimum 1).
    pub fn with_channel_buffer(mut self, size: usize) -> Self {
        self.channel_buffer = size.max(1);
        self
    }
}
