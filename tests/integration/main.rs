//! Integration tests for datamerge.
//!
//! Each test builds an input tree in a temporary directory, runs the full
//! pipeline (directory walk, workers, rotating sink) and checks the files it
//! leaves behind.
//!
//! ## Running Integration Tests
//!
//! ```bash
//! cargo test -p integration-tests
//! ```

mod common;
mod discoverer_test;
mod merge_test;
