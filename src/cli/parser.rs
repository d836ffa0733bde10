//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::client::DEFAULT_API_URL;
use crate::io::TokenStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ragchat: terminal client for a retrieval-augmented chat backend.
///
/// Signs in, manages chat sessions, and streams answers as the backend
/// produces them.
#[derive(Parser, Debug)]
#[command(name = "ragchat")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base URL of the chat backend.
    #[arg(long, env = "RAGCHAT_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Path to the stored sign-in token.
    ///
    /// Defaults to `ragchat/token` under the user config directory.
    #[arg(long, env = "RAGCHAT_TOKEN_PATH", global = true)]
    pub token_path: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account.
    Register {
        /// Account e-mail (case-insensitive).
        email: String,

        /// Display name.
        username: String,

        /// Password (reads a line from stdin if not provided).
        #[arg(long, env = "RAGCHAT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign in and store the token.
    Login {
        /// Account e-mail (case-insensitive).
        email: String,

        /// Password (reads a line from stdin if not provided).
        #[arg(long, env = "RAGCHAT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out and forget the stored token.
    Logout,

    /// Show the signed-in user.
    #[command(alias = "profile")]
    Whoami,

    /// List chat sessions.
    #[command(name = "sessions", alias = "ls")]
    ListSessions,

    /// Create a chat session.
    #[command(name = "new")]
    NewSession {
        /// Session name.
        name: String,
    },

    /// Rename a chat session.
    Rename {
        /// Session ID.
        id: i64,

        /// New name.
        name: String,
    },

    /// Delete a chat session and its history.
    #[command(name = "delete", alias = "rm")]
    DeleteSession {
        /// Session ID.
        id: i64,

        /// Skip confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show a session's messages.
    History {
        /// Session ID.
        id: i64,

        /// Show whole messages instead of one line each.
        #[arg(long)]
        full: bool,
    },

    /// Ask a question in a session.
    ///
    /// The answer is streamed as it is generated unless `--no-stream` is given.
    #[command(alias = "chat")]
    Ask {
        /// Session ID.
        session: i64,

        /// The question (reads stdin if not provided).
        prompt: Option<String>,

        /// Wait for the complete answer instead of streaming it.
        #[arg(long)]
        no_stream: bool,
    },

    /// Show the sources of the last answer in a session.
    Sources {
        /// Session ID.
        session: i64,
    },
}

impl Cli {
    /// Returns the token file path, using the default if not specified.
    #[must_use]
    pub fn get_token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(TokenStore::default_path)
    }
}
