//! Streamed reply handling.
//!
//! Raw chunks flow through [`FrameDecoder`] into frames, frames decode into
//! [`StreamEvent`]s, and the reducer folds events into the assistant
//! message. [`StreamingReplyAssembler`] ties the pieces together for one
//! turn and owns its lifecycle.

pub mod assembler;
pub mod event;
pub mod frame;
pub mod reducer;

pub use assembler::{StreamOutcome, StreamingReplyAssembler, TurnEnd, TurnState};
pub use event::{DATA_PREFIX, FrameError, StepNode, StreamEvent, decode_frame, parse_frame};
pub use frame::{FRAME_DELIMITER, FrameDecoder};
pub use reducer::{ERROR_TEXT, PROCESSING_TEXT, ReplyDraft, apply, fail};
