//! Frame splitting over a chunked byte stream.
//!
//! Frames are separated by a blank line (`"\n\n"`). A chunk may end
//! anywhere: inside a frame, between the two delimiter newlines, or inside
//! a multi-byte character. [`FrameDecoder`] owns the carry-over state so the
//! frames it yields depend only on the bytes, not on how they were split.

use crate::io::Utf8Decoder;

/// Delimiter between frames.
pub const FRAME_DELIMITER: &str = "\n\n";

/// Accumulates text and yields complete frames.
///
/// # Examples
///
/// ```
/// use ragchat::stream::FrameDecoder;
///
/// let mut decoder = FrameDecoder::new();
/// assert!(decoder.push_str("data: a\n").is_empty());
/// assert_eq!(decoder.push_str("\ndata: b"), vec!["data: a".to_string()]);
/// assert_eq!(decoder.take_remainder(), Some("data: b".to_string()));
/// ```
#[derive(Debug, Default, Clone)]
pub struct FrameDecoder {
    utf8: Utf8Decoder,
    buffer: String,
}

impl FrameDecoder {
    /// Creates a decoder with an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            utf8: Utf8Decoder::new(),
            buffer: String::new(),
        }
    }

    /// Decodes raw bytes and returns every frame they complete.
    pub fn push_bytes(&mut self, chunk: &[u8]) -> Vec<String> {
        let text = self.utf8.decode(chunk);
        self.push_str(&text)
    }

    /// Appends text and returns every frame it completes, in order.
    ///
    /// Text after the last delimiter stays buffered for the next call.
    pub fn push_str(&mut self, text: &str) -> Vec<String> {
        // Buffered text holds no delimiter, so only its last byte can start one.
        let mut search_from = self
            .buffer
            .len()
            .saturating_sub(FRAME_DELIMITER.len() - 1);
        self.buffer.push_str(text);

        let mut frames = Vec::new();
        let mut consumed = 0;
        while let Some(pos) = find_delimiter(&self.buffer.as_bytes()[search_from..]) {
            let end = search_from + pos;
            frames.push(self.buffer[consumed..end].to_string());
            consumed = end + FRAME_DELIMITER.len();
            search_from = consumed;
        }
        self.buffer.drain(..consumed);
        frames
    }

    /// Takes whatever is left at end of stream.
    ///
    /// Pending partial characters are flushed first. Returns `None` when
    /// only whitespace remains.
    pub fn take_remainder(&mut self) -> Option<String> {
        let tail = self.utf8.finish();
        self.buffer.push_str(&tail);
        let rest = std::mem::take(&mut self.buffer);
        let trimmed = rest.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Clears buffered text and pending bytes.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.utf8.reset();
    }

    /// Bytes of text buffered but not yet framed.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.utf8.pending_len() == 0
    }
}

/// Byte offset of the first delimiter. The delimiter is ASCII, so the
/// offset is always a char boundary.
fn find_delimiter(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(FRAME_DELIMITER.len())
        .position(|window| window == FRAME_DELIMITER.as_bytes())
}
