//! dm-discoverer - input tree discovery for datamerge.
//!
//! Walks an input root recursively and yields every regular file beneath it
//! as an [`InputFile`](dm_types::InputFile). The walk runs on a blocking
//! thread and hands files over through a bounded channel, so slow directory
//! I/O never stalls the async workers and a slow consumer throttles the walk.
//!
//! # Example
//!
//! ```ignore
//! use dm_discoverer::{Discoverer, DiscoveryConfig};
//! use dm_traits::FileSource;
//!
//! let mut discoverer = Discoverer::spawn("/data/in", DiscoveryConfig::new());
//! while let Some(file) = discoverer.next_file().await? {
//!     println!("{}", file);
//! }
//! ```

pub mod config;
pub mod discoverer;
pub mod stats;

pub use config::DiscoveryConfig;
pub use discoverer::Discoverer;
pub use stats::DiscoveryStats;
