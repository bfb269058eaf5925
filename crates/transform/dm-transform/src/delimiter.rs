//! Compiled delimiter pattern.

use dm_error::{ConfigError, Result};
use regex::Regex;
use std::borrow::Cow;
use tracing::debug;

/// Separator every detected delimiter is rewritten to.
pub const CANONICAL_DELIMITER: char = ':';

/// Default candidate delimiters.
pub const DEFAULT_DELIMITERS: &str = ":|;";

/// Matcher for the first occurrence of any candidate delimiter on a line.
///
/// Every character of the configured string is a literal candidate, so
/// regex metacharacters such as `|` or `-` need no escaping by the caller.
/// The pattern is immutable and is shared read-only across workers.
#[derive(Debug, Clone)]
pub struct DelimiterPattern {
    regex: Regex,
    delimiters: Vec<char>,
}

impl DelimiterPattern {
    /// Compile a pattern from a set of candidate delimiter characters.
    ///
    /// Duplicate characters are ignored. An empty set is rejected.
    pub fn new(delimiters: &str) -> Result<Self> {
        let mut chars: Vec<char> = Vec::new();
        for c in delimiters.chars() {
            if !chars.contains(&c) {
                chars.push(c);
            }
        }

        if chars.is_empty() {
            return Err(ConfigError::InvalidDelimiters(
                "at least one delimiter character is required".to_string(),
            )
            .into());
        }

        let class: String = chars
            .iter()
            .map(|c| regex::escape(c.encode_utf8(&mut [0; 4])))
            .collect();

        // Lazy prefix so the split lands on the first delimiter.
        let source = format!("^(.*?)[{}](.*)$", class);
        let regex = Regex::new(&source)
            .map_err(|e| ConfigError::InvalidDelimiters(format!("{}: {}", delimiters, e)))?;

        debug!(pattern = %source, "Compiled delimiter pattern");

        Ok(Self {
            regex,
            delimiters: chars,
        })
    }

    /// The de-duplicated candidate delimiters, in configured order.
    pub fn delimiters(&self) -> &[char] {
        &self.delimiters
    }

    /// Rewrite the first delimiter in `line` to [`CANONICAL_DELIMITER`].
    ///
    /// Lines without a delimiter are returned borrowed and unchanged.
    pub fn normalize<'a>(&self, line: &'a str) -> Cow<'a, str> {
        self.regex.replace(line, "${1}:${2}")
    }
}
