//! Splitting a stored reply into answer text and sources.
//!
//! Replies streamed with a structured `sources` field keep their sources
//! apart from the text. Replies stored by current backends embed them
//! after a literal marker instead, so history still has to be split here.

/// Marker that separates the answer from the appended source list.
pub const SOURCES_MARKER: &str = "SOURCES OF INFORMATION:";

/// A reply separated into the text to show and its sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyBody<'a> {
    /// Answer text with leading whitespace and the sources section removed.
    pub answer: &'a str,

    /// Trimmed sources section, `None` when absent or empty.
    pub sources: Option<&'a str>,
}

/// Splits reply text at the sources marker.
///
/// # Examples
///
/// ```
/// use ragchat::core::split_reply;
///
/// let body = split_reply("  Paris.\n\nSOURCES OF INFORMATION:\n- atlas.pdf");
/// assert_eq!(body.answer, "Paris.\n");
/// assert_eq!(body.sources, Some("- atlas.pdf"));
/// ```
#[must_use]
pub fn split_reply(content: &str) -> ReplyBody<'_> {
    let answer = content.find(&format!("\n{SOURCES_MARKER}")).map_or_else(
        || content.trim(),
        |pos| &content[..pos],
    );
    let answer = answer.trim_start_matches([' ', '\n']);

    let sources = content
        .rfind(SOURCES_MARKER)
        .map(|pos| content[pos + SOURCES_MARKER.len()..].trim())
        .filter(|s| !s.is_empty());

    ReplyBody { answer, sources }
}

/// Renders the sources of a reply for display.
///
/// Structured sources win over the in-text section.
#[must_use]
pub fn format_sources(content: &str, structured: &[String]) -> Option<String> {
    if !structured.is_empty() {
        return Some(
            structured
                .iter()
                .map(|s| format!("- {s}"))
                .collect::<Vec<_>>()
                .join("\n\n"),
        );
    }
    split_reply(content).sources.map(ToString::to_string)
}
