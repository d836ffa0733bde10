//! Streaming reply assembly.
//!
//! [`StreamingReplyAssembler`] turns the chunks of one streamed response
//! into an evolving assistant message. One assembler serves one turn:
//!
//! ```text
//! Idle --start--> Streaming{has_content: false} --first part--> Streaming{has_content: true}
//!   any Streaming state --Done | end of stream | failure--> Finalized
//! ```
//!
//! Nothing moves a turn out of `Finalized`; chunks fed after that point are
//! ignored.

use super::event::{StreamEvent, decode_frame};
use super::frame::FrameDecoder;
use super::reducer::{PROCESSING_TEXT, ReplyDraft, apply, fail};
use crate::core::{ChatLog, ChatMessage};
use crate::error::{Error, Result, StreamError};
use tracing::{debug, warn};

/// How the transport ended.
#[derive(Debug)]
pub enum StreamOutcome {
    /// The body ended normally.
    Completed,

    /// The request or the body read failed.
    Failed(Error),
}

/// Why a turn was finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEnd {
    /// A `done` event arrived.
    Done,

    /// The body ended without a `done` event.
    Completed,

    /// The transport failed; the message shows the error text.
    Failed,
}

/// Observable state of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// `start` has not been called.
    Idle,

    /// Chunks are being applied.
    Streaming {
        /// Whether a response part has replaced the placeholder.
        has_content: bool,
    },

    /// The message is final.
    Finalized(TurnEnd),
}

#[derive(Debug)]
enum Phase {
    Idle,
    Streaming(ReplyDraft),
    Finalized { message: ChatMessage, end: TurnEnd },
}

/// Assembles one assistant reply from a chunked event stream.
///
/// # Examples
///
/// ```
/// use ragchat::core::ChatLog;
/// use ragchat::stream::{StreamOutcome, StreamingReplyAssembler};
///
/// let mut log = ChatLog::new();
/// log.push_user("Hi");
///
/// let mut assembler = StreamingReplyAssembler::new();
/// assembler.start(&mut log).unwrap();
/// assembler.feed(b"data: {\"type\":\"response\",\"content\":\"Hel");
/// assembler.feed(b"lo\"}\n\n");
/// assembler.finish(StreamOutcome::Completed);
/// assembler.publish(&mut log);
///
/// assert_eq!(log.last().unwrap().content, "Hello");
/// assert_eq!(log.len(), 2);
/// ```
#[derive(Debug)]
pub struct StreamingReplyAssembler {
    frames: FrameDecoder,
    phase: Phase,
}

impl Default for StreamingReplyAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingReplyAssembler {
    /// Creates an idle assembler.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            frames: FrameDecoder::new(),
            phase: Phase::Idle,
        }
    }

    /// Begins the turn: clears the buffer and appends the placeholder reply
    /// to `log`.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::AlreadyStarted`] if called more than once.
    pub fn start(&mut self, log: &mut ChatLog) -> Result<&ChatMessage> {
        if !matches!(self.phase, Phase::Idle) {
            return Err(Error::Stream(StreamError::AlreadyStarted));
        }
        self.frames.reset();
        let id = log.begin_reply(PROCESSING_TEXT);
        debug!(message_id = id, "reply stream started");
        self.phase = Phase::Streaming(ReplyDraft::new(id));
        self.message().ok_or_else(|| Error::InvalidState {
            message: "reply missing after start".to_string(),
        })
    }

    /// Feeds one raw chunk and applies every event it completes.
    ///
    /// Returns the events applied by this call. Processing stops at `done`;
    /// anything after it in the same chunk is discarded.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        match self.phase {
            Phase::Streaming(_) => {
                let frames = self.frames.push_bytes(chunk);
                self.apply_frames(frames)
            }
            Phase::Idle => {
                warn!(bytes = chunk.len(), "chunk received before start; ignored");
                Vec::new()
            }
            Phase::Finalized { .. } => {
                debug!(bytes = chunk.len(), "chunk received after finalization; ignored");
                Vec::new()
            }
        }
    }

    /// Text variant of [`feed`](Self::feed).
    pub fn feed_str(&mut self, chunk: &str) -> Vec<StreamEvent> {
        self.feed(chunk.as_bytes())
    }

    /// Finalizes the turn.
    ///
    /// On [`StreamOutcome::Completed`] a trailing frame without a closing
    /// delimiter is still decoded. On [`StreamOutcome::Failed`] the content
    /// is replaced by the fixed error text, discarding partial output.
    /// Does nothing once finalized.
    pub fn finish(&mut self, outcome: StreamOutcome) -> Option<&ChatMessage> {
        if !matches!(self.phase, Phase::Streaming(_)) {
            if let StreamOutcome::Failed(err) = outcome {
                debug!(error = %err, "transport failure after finalization ignored");
            }
            return self.message();
        }

        match outcome {
            StreamOutcome::Completed => {
                if let Some(rest) = self.frames.take_remainder() {
                    debug!(bytes = rest.len(), "decoding trailing frame");
                    self.apply_frames(vec![rest]);
                }
                // The trailing frame may itself have been `done`.
                if let Some(draft) = self.take_draft() {
                    self.finalize(draft, TurnEnd::Completed);
                }
            }
            StreamOutcome::Failed(err) => {
                warn!(error = %err, "reply stream failed");
                if let Some(draft) = self.take_draft() {
                    self.finalize(fail(draft), TurnEnd::Failed);
                }
            }
        }
        self.message()
    }

    /// Copies the current message into `log`, ending the live slot once
    /// the turn is final.
    ///
    /// Returns false if `log` no longer holds this reply as its live entry.
    pub fn publish(&self, log: &mut ChatLog) -> bool {
        let Some(message) = self.message() else {
            return false;
        };
        let updated = log.update_live(message);
        if self.is_finalized() {
            log.finalize_live();
        }
        updated
    }

    /// The message as currently assembled.
    #[must_use]
    pub const fn message(&self) -> Option<&ChatMessage> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Streaming(draft) => Some(&draft.message),
            Phase::Finalized { message, .. } => Some(message),
        }
    }

    /// Current turn state.
    #[must_use]
    pub const fn state(&self) -> TurnState {
        match &self.phase {
            Phase::Idle => TurnState::Idle,
            Phase::Streaming(draft) => TurnState::Streaming {
                has_content: draft.has_content,
            },
            Phase::Finalized { end, .. } => TurnState::Finalized(*end),
        }
    }

    /// Returns true once no further events will be applied.
    ///
    /// The transport read loop stops reading at this point.
    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        matches!(self.phase, Phase::Finalized { .. })
    }

    /// Bytes buffered but not yet framed.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.frames.buffered_len()
    }

    fn apply_frames(&mut self, frames: Vec<String>) -> Vec<StreamEvent> {
        let mut applied = Vec::new();
        for frame in frames {
            let Some(event) = decode_frame(&frame) else {
                continue;
            };
            let Some(draft) = self.take_draft() else {
                break;
            };
            let draft = apply(draft, &event);
            let done = event == StreamEvent::Done;
            applied.push(event);
            if done {
                self.finalize(draft, TurnEnd::Done);
                break;
            }
            self.phase = Phase::Streaming(draft);
        }
        applied
    }

    /// Moves the draft out while streaming. Any other phase is left as is.
    fn take_draft(&mut self) -> Option<ReplyDraft> {
        if !matches!(self.phase, Phase::Streaming(_)) {
            return None;
        }
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Streaming(draft) => Some(draft),
            other => {
                self.phase = other;
                None
            }
        }
    }

    fn finalize(&mut self, draft: ReplyDraft, end: TurnEnd) {
        self.frames.reset();
        debug!(
            message_id = draft.message.id,
            end = ?end,
            bytes = draft.message.content.len(),
            "reply finalized"
        );
        self.phase = Phase::Finalized {
            message: draft.message,
            end,
        };
    }
}
