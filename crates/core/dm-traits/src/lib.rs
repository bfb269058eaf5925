//! Core traits for datamerge.
//!
//! This crate defines the two seams of the merge pipeline:
//! - [`FileSource`] - Trait for input file producers (directory walk, fixed lists)
//! - [`LineSink`] - Trait for the single sequential consumer of normalized lines

pub mod sink;
pub mod source;

pub use sink::*;
pub use source::*;
