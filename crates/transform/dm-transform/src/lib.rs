//! Line normalization for datamerge.
//!
//! This crate provides [`DelimiterPattern`], a compiled matcher for a set of
//! candidate field delimiters, and [`transform_line`], the pure per-line step
//! run by every file worker.
//!
//! The first delimiter found on a line becomes the key/value split and is
//! rewritten to the canonical [`CANONICAL_DELIMITER`]. Later delimiters are
//! left untouched.
//!
//! # Example
//!
//! ```
//! use dm_transform::{DelimiterPattern, transform_line};
//!
//! let pattern = DelimiterPattern::new(":|;").unwrap();
//!
//! assert_eq!(transform_line("  user;pass;x ", &pattern).as_deref(), Some("user:pass;x"));
//! assert_eq!(transform_line("   ", &pattern), None);
//! ```

mod delimiter;
mod line;

pub use delimiter::{CANONICAL_DELIMITER, DEFAULT_DELIMITERS, DelimiterPattern};
pub use line::transform_line;
