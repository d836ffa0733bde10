//! Incremental UTF-8 decoding for network chunks.
//!
//! A transport may split a multi-byte character across two reads. The
//! decoder keeps the incomplete tail of one chunk and completes it with the
//! head of the next, so the text it yields does not depend on where the
//! chunk boundaries fall.

/// Streaming UTF-8 decoder.
///
/// Invalid sequences decode to U+FFFD instead of failing, so one corrupt
/// byte cannot abort a stream.
///
/// # Examples
///
/// ```
/// use ragchat::io::Utf8Decoder;
///
/// let bytes = "世界".as_bytes();
/// let mut decoder = Utf8Decoder::new();
/// let mut text = decoder.decode(&bytes[..2]);
/// text.push_str(&decoder.decode(&bytes[2..]));
/// assert_eq!(text, "世界");
/// ```
#[derive(Debug, Default, Clone)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Creates a decoder with no pending bytes.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Decodes a chunk, carrying an incomplete trailing sequence.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest: &[u8] = &bytes;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let valid_up_to = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid_up_to]));
                    if let Some(invalid_len) = err.error_len() {
                        out.push(char::REPLACEMENT_CHARACTER);
                        rest = &rest[valid_up_to + invalid_len..];
                    } else {
                        // Incomplete sequence at the end: wait for more bytes
                        self.pending = rest[valid_up_to..].to_vec();
                        break;
                    }
                }
            }
        }
        out
    }

    /// Flushes the decoder at end of input.
    ///
    /// An incomplete trailing sequence becomes a single U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }

    /// Number of bytes held back waiting for the rest of a character.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drops any pending bytes.
    pub fn reset(&mut self) {
        self.pending.clear();
    }
}
