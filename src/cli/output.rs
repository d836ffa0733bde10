//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::client::LoginUser;
use crate::core::{ChatLog, ChatMessage, Profile, Role, SessionSummary, format_sources, split_reply};
use crate::error::Error;
use crate::io::ellipsize;
use serde::Serialize;
use std::fmt::Write;
use std::io;

/// Shown when a reply has no sources.
pub const NO_SOURCES_TEXT: &str = "No sources available";

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats an error for the selected output.
#[must_use]
pub fn format_error(err: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => err.to_string(),
        OutputFormat::Json => format_json(&serde_json::json!({ "error": err.to_string() })),
    }
}

/// Formats a one-line confirmation.
#[must_use]
pub fn format_message(message: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{message}\n"),
        OutputFormat::Json => format_json(&serde_json::json!({ "message": message })),
    }
}

/// Formats the result of a sign-in.
#[must_use]
pub fn format_login(email: &str, user: Option<&LoginUser>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => match user {
            Some(user) => format!("Signed in as {} <{}>\n", user.username, user.email),
            None => format!("Signed in as {email}\n"),
        },
        OutputFormat::Json => {
            format_json(&serde_json::json!({ "signed_in": true, "email": email, "user": user }))
        }
    }
}

/// Formats the signed-in user's profile.
#[must_use]
pub fn format_profile(profile: &Profile, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "  Username:  {}", profile.username);
            let _ = writeln!(output, "  Email:     {}", profile.email);
            output
        }
        OutputFormat::Json => format_json(profile),
    }
}

/// Formats a session list.
#[must_use]
pub fn format_session_list(sessions: &[SessionSummary], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_session_list_text(sessions),
        OutputFormat::Json => format_json(&sessions),
    }
}

fn format_session_list_text(sessions: &[SessionSummary]) -> String {
    if sessions.is_empty() {
        return "No sessions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str("Sessions:\n");
    let _ = writeln!(output, "{:<6} {:<30} Updated", "ID", "Name");
    output.push_str(&"-".repeat(60));
    output.push('\n');

    for session in sessions {
        let updated = session.updated_at.as_deref().unwrap_or("-");
        let _ = writeln!(
            output,
            "{:<6} {:<30} {}",
            session.id,
            ellipsize(&session.name, 30),
            updated
        );
    }

    output
}

/// Formats a single session after a create or rename.
#[must_use]
pub fn format_session(session: &SessionSummary, action: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{action} session {}: {}\n", session.id, session.name),
        OutputFormat::Json => format_json(session),
    }
}

/// Formats a session's messages.
///
/// Without `full`, each message is shortened to one line.
#[must_use]
pub fn format_history(log: &ChatLog, full: bool, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_history_text(log, full),
        OutputFormat::Json => format_json(&log.messages()),
    }
}

fn format_history_text(log: &ChatLog, full: bool) -> String {
    if log.is_empty() {
        return "No messages in this session.\n".to_string();
    }

    let mut output = String::new();
    for message in log.messages() {
        let text = display_text(message);
        if full {
            let _ = writeln!(output, "[{}]", message.role);
            let _ = writeln!(output, "{text}\n");
        } else {
            let _ = writeln!(output, "{:<10} {}", message.role.label(), ellipsize(text, 70));
        }
    }
    output
}

/// Formats a finished reply.
///
/// With `answer_shown`, the text output only carries the sources, since the
/// answer was already rendered live.
#[must_use]
pub fn format_reply(message: &ChatMessage, answer_shown: bool, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            if answer_shown {
                output.push('\n');
            } else {
                let _ = writeln!(output, "{}", split_reply(&message.content).answer);
            }
            if let Some(sources) = format_sources(&message.content, &message.sources) {
                let _ = write!(output, "\nSources:\n{sources}\n");
            }
            output
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct Reply<'a> {
                answer: &'a str,
                sources: Option<String>,
            }
            let reply = Reply {
                answer: split_reply(&message.content).answer,
                sources: format_sources(&message.content, &message.sources),
            };
            format_json(&reply)
        }
    }
}

/// Formats the sources of a reply, or a notice when there are none.
#[must_use]
pub fn format_source_list(message: Option<&ChatMessage>, format: OutputFormat) -> String {
    let sources = message.and_then(|m| format_sources(&m.content, &m.sources));
    match format {
        OutputFormat::Text => {
            format!("{}\n", sources.as_deref().unwrap_or(NO_SOURCES_TEXT))
        }
        OutputFormat::Json => format_json(&serde_json::json!({ "sources": sources })),
    }
}

fn display_text(message: &ChatMessage) -> &str {
    match message.role {
        Role::Assistant => split_reply(&message.content).answer,
        Role::User => &message.content,
    }
}

/// Renders a growing reply to a terminal.
///
/// Text that extends what is already on screen is written as a suffix.
/// Anything else, such as a status line giving way to the first answer
/// part, starts a fresh line.
#[derive(Debug)]
pub struct LiveRenderer<W: io::Write> {
    out: W,
    shown: String,
}

impl<W: io::Write> LiveRenderer<W> {
    /// Creates a renderer writing to `out`.
    pub const fn new(out: W) -> Self {
        Self {
            out,
            shown: String::new(),
        }
    }

    /// Brings the screen up to date with `content`.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn update(&mut self, content: &str) -> io::Result<()> {
        if content == self.shown {
            return Ok(());
        }
        if let Some(suffix) = content.strip_prefix(self.shown.as_str())
            && !self.shown.is_empty()
        {
            self.out.write_all(suffix.as_bytes())?;
        } else {
            if !self.shown.is_empty() {
                self.out.write_all(b"\n")?;
            }
            self.out.write_all(content.as_bytes())?;
        }
        self.out.flush()?;
        content.clone_into(&mut self.shown);
        Ok(())
    }

    /// Consumes the renderer and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
