//! Error types for ragchat operations.
//!
//! This module provides the error hierarchy using `thiserror` for
//! credential handling, backend API calls, reply streaming, local I/O,
//! and CLI commands.

use thiserror::Error;

/// Result type alias for ragchat operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for ragchat operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Credential and sign-in errors.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Backend API errors (HTTP transport or non-success responses).
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Reply stream errors.
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    /// Token file and other local I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// An operation ran in a state that does not allow it.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Description of the invalid state.
        message: String,
    },

    /// Invalid configuration, such as a malformed API URL.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Credential and sign-in errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No usable credential is held.
    #[error("not signed in. Run: ragchat login")]
    SignInRequired,

    /// The credential's `exp` claim lies in the past.
    #[error("session expired at {expired_at}. Run: ragchat login")]
    Expired {
        /// Expiry as seconds since the Unix epoch.
        expired_at: i64,
    },

    /// The credential could not be decoded.
    #[error("invalid credential: {reason}")]
    InvalidCredential {
        /// Why decoding failed.
        reason: String,
    },
}

/// Backend API errors.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("server returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Backend error message, or the status reason.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Reply stream errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The body failed while being read.
    #[error("read failed: {0}")]
    Read(String),

    /// The stream was started twice for one turn.
    #[error("stream already started")]
    AlreadyStarted,
}

/// Token file errors.
#[derive(Error, Debug)]
pub enum IoError {
    /// The token file exists but could not be read.
    #[error("cannot read token file {path}: {reason}")]
    TokenRead {
        /// Token file path.
        path: String,
        /// OS error text.
        reason: String,
    },

    /// The token file could not be written, chmod-ed or removed.
    #[error("cannot write token file {path}: {reason}")]
    TokenWrite {
        /// Token file path.
        path: String,
        /// OS error text.
        reason: String,
    },

    /// The token file's parent directory could not be created.
    #[error("cannot create directory {path}: {reason}")]
    CreateDir {
        /// Directory that was being created.
        path: String,
        /// OS error text.
        reason: String,
    },

    /// Any other I/O failure.
    #[error("I/O error: {0}")]
    Other(String),
}

/// Errors raised by the command layer before or around a backend call.
#[derive(Error, Debug)]
pub enum CommandError {
    /// A required value was neither passed nor readable from stdin.
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    /// A destructive command ran without `--yes`.
    #[error("{action} needs confirmation. Pass --yes to proceed")]
    ConfirmationRequired {
        /// What would have happened.
        action: String,
    },

    /// Standard input could not be read.
    #[error("failed to read stdin: {0}")]
    Stdin(String),

    /// The command could not run at all.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Other(err.to_string()))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_builder() {
            Self::InvalidUrl(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Api(err.into())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Api(err.into())
    }
}
