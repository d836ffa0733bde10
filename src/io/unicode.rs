//! Unicode utilities for terminal output.
//!
//! Session names and replies are frequently non-ASCII, so anything that
//! shortens text for display works on grapheme clusters, never bytes.

use unicode_segmentation::UnicodeSegmentation;

/// Counts the number of grapheme clusters in a string.
///
/// # Examples
///
/// ```
/// use ragchat::io::unicode::grapheme_count;
///
/// assert_eq!(grapheme_count("Hello"), 5);
/// assert_eq!(grapheme_count("xử lý"), 5);
/// ```
#[must_use]
pub fn grapheme_count(s: &str) -> usize {
    s.graphemes(true).count()
}

/// Returns the first `max` grapheme clusters of `s`.
///
/// # Examples
///
/// ```
/// use ragchat::io::truncate_graphemes;
///
/// assert_eq!(truncate_graphemes("lý do", 2), "lý");
/// ```
#[must_use]
pub fn truncate_graphemes(s: &str, max: usize) -> &str {
    s.grapheme_indices(true)
        .nth(max)
        .map_or(s, |(cut, _)| &s[..cut])
}

/// Shortens text to `max` graphemes for a single table cell.
///
/// Newlines are shown as `\n` and an ellipsis marks truncation.
#[must_use]
pub fn ellipsize(s: &str, max: usize) -> String {
    let flat = s.replace('\n', "\\n");
    if grapheme_count(&flat) <= max {
        return flat;
    }
    if max <= 3 {
        return truncate_graphemes(&flat, max).to_string();
    }
    format!("{}...", truncate_graphemes(&flat, max - 3))
}
