//! Stream events and frame payload decoding.
//!
//! Each frame carries one `data:` line whose remainder is a JSON object
//! with a `type` field:
//!
//! ```text
//! data: {"type": "step", "node": "retrieve"}
//! data: {"type": "response", "content": "Hello", "sources": ["doc.pdf"]}
//! data: {"type": "done"}
//! ```
//!
//! Frames that do not decode are dropped and logged; they never end the
//! stream. Unknown `type` values are skipped so newer backends can add
//! event kinds.

use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Prefix every meaningful frame line starts with.
pub const DATA_PREFIX: &str = "data:";

/// Pipeline node reported by a `step` event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StepNode {
    /// Deciding whether the question needs retrieval.
    ClassifyQuestion,
    /// Fetching candidate documents.
    Retrieve,
    /// Scoring retrieved documents for relevance.
    GradeDocuments,
    /// Writing the answer.
    Generate,
    /// Rewriting the question for another retrieval pass.
    TransformQuery,
    /// Checking the answer against the documents.
    GradeGeneration,
    /// Saving conversation memory.
    UpdateMemory,
    /// Retry budget exhausted.
    MaxRetries,
    /// A node this client does not know.
    Other(String),
}

impl StepNode {
    /// Parses a node name from the wire.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "classify_question" => Self::ClassifyQuestion,
            "retrieve" => Self::Retrieve,
            "grade_documents" => Self::GradeDocuments,
            "generate" => Self::Generate,
            "transform_query" => Self::TransformQuery,
            "grade_generation" => Self::GradeGeneration,
            "update_memory" => Self::UpdateMemory,
            "max_retries" => Self::MaxRetries,
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire name of the node.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ClassifyQuestion => "classify_question",
            Self::Retrieve => "retrieve",
            Self::GradeDocuments => "grade_documents",
            Self::Generate => "generate",
            Self::TransformQuery => "transform_query",
            Self::GradeGeneration => "grade_generation",
            Self::UpdateMemory => "update_memory",
            Self::MaxRetries => "max_retries",
            Self::Other(name) => name,
        }
    }

    /// Status line shown while the node runs.
    #[must_use]
    pub const fn status_text(&self) -> &'static str {
        match self {
            Self::ClassifyQuestion => "Classifying question...",
            Self::Retrieve => "Retrieving documents...",
            Self::GradeDocuments => "Grading documents...",
            Self::Generate => "Generating answer...",
            Self::TransformQuery => "Rewriting question...",
            Self::GradeGeneration => "Grading answer...",
            Self::UpdateMemory => "Updating memory...",
            Self::MaxRetries | Self::Other(_) => super::reducer::PROCESSING_TEXT,
        }
    }
}

impl fmt::Display for StepNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded stream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// The backend entered a pipeline node.
    Step {
        /// Node being executed.
        node: StepNode,
    },

    /// A fragment of the answer.
    ResponsePart {
        /// Text to replace (first part) or append (later parts).
        content: String,
        /// Structured sources attached to this part.
        sources: Vec<String>,
    },

    /// End of the reply; no more events will be applied.
    Done,
}

impl StreamEvent {
    /// Convenience constructor for a response part without sources.
    pub fn response(content: impl Into<String>) -> Self {
        Self::ResponsePart {
            content: content.into(),
            sources: Vec::new(),
        }
    }

    /// Convenience constructor for a step event.
    #[must_use]
    pub fn step(node: &str) -> Self {
        Self::Step {
            node: StepNode::parse(node),
        }
    }
}

/// Why a frame was dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The first line does not start with `data:`.
    #[error("frame does not start with \"data:\"")]
    MissingPrefix,

    /// The payload is not a JSON object.
    #[error("payload is not a JSON object: {0}")]
    InvalidPayload(String),

    /// A text field required by the event type is missing or not a string.
    #[error("missing field `{field}` for event type `{event_type}`")]
    MissingField {
        /// Event type being decoded.
        event_type: String,
        /// Name of the missing field.
        field: &'static str,
    },
}

/// Parses one frame.
///
/// Only the fields the event type needs are read. Other fields, whatever
/// their type, are ignored. A `sources` value that is not an array of
/// strings yields the string items it has, or none.
///
/// Returns `Ok(None)` for well-formed frames of an unknown type.
///
/// # Errors
///
/// Returns a [`FrameError`] describing why the frame is malformed.
pub fn parse_frame(frame: &str) -> Result<Option<StreamEvent>, FrameError> {
    let line = frame.lines().next().unwrap_or_default();
    let json = line
        .strip_prefix(DATA_PREFIX)
        .ok_or(FrameError::MissingPrefix)?
        .trim();

    let value: Value =
        serde_json::from_str(json).map_err(|e| FrameError::InvalidPayload(e.to_string()))?;
    let Some(payload) = value.as_object() else {
        return Err(FrameError::InvalidPayload(format!("expected object, got {value}")));
    };
    let kind = payload
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| FrameError::InvalidPayload("`type` is missing or not a string".to_string()))?;

    let text_field = |field: &'static str| {
        payload
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| FrameError::MissingField {
                event_type: kind.to_string(),
                field,
            })
    };
    let event = match kind {
        "step" => StreamEvent::Step {
            node: StepNode::parse(text_field("node")?),
        },
        "response" => StreamEvent::ResponsePart {
            content: text_field("content")?.to_string(),
            sources: string_items(payload.get("sources")),
        },
        "done" => StreamEvent::Done,
        other => {
            debug!(event_type = other, "skipping unknown event type");
            return Ok(None);
        }
    };
    Ok(Some(event))
}

fn string_items(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Decodes one frame, dropping it if malformed.
///
/// # Examples
///
/// ```
/// use ragchat::stream::{StreamEvent, decode_frame};
///
/// let event = decode_frame(r#"data: {"type":"response","content":"x"}"#);
/// assert_eq!(event, Some(StreamEvent::response("x")));
/// assert_eq!(decode_frame("data: bad-json"), None);
/// ```
#[must_use]
pub fn decode_frame(frame: &str) -> Option<StreamEvent> {
    if frame.trim().is_empty() {
        return None;
    }
    match parse_frame(frame) {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err, frame = %frame, "dropping malformed frame");
            None
        }
    }
}
