//! Per-line transformation.

use crate::DelimiterPattern;

/// Trim a raw line and normalize its first delimiter.
///
/// Returns `None` for lines that are empty after trimming; those never enter
/// the output queue.
pub fn transform_line(raw: &str, pattern: &DelimiterPattern) -> Option<String> {
    let line = raw.trim();
    if line.is_empty() {
        return None;
    }
    Some(pattern.normalize(line).into_owned())
}
