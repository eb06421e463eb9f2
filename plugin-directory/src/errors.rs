//! Crate-wide error hierarchy for plugin-directory.

use ai_llm_service::AiLlmError;
use thiserror::Error;

/// Convenient alias for directory results.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Root error type for directory searches.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The directory answered with a non-success HTTP status.
    /// `message` is the status text.
    #[error("{message}")]
    Fetch { status: u16, message: String },

    /// The payload did not have the expected shape.
    #[error("invalid directory response: {0}")]
    Parse(String),

    /// Timeout at transport level.
    #[error("directory request timed out")]
    Timeout,

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("network error: {0}")]
    Transport(String),

    /// Configuration problems (bad base URL, page size, ...).
    #[error(transparent)]
    Config(#[from] DirectoryConfigError),
}

/// Configuration errors raised while reading the environment.
#[derive(Debug, Error)]
pub enum DirectoryConfigError {
    /// A number failed to parse or fell outside its range.
    #[error("invalid number in {var}: {reason}")]
    InvalidNumber {
        var: &'static str,
        reason: &'static str,
    },

    /// The API base URL is not an http(s) URL.
    #[error("invalid directory api url: {0}")]
    InvalidBaseUrl(String),

    /// Unknown `WP_DESCRIPTION_MODE` value.
    #[error("unknown description mode: {0}")]
    UnknownDescriptionMode(String),
}

/// Errors from the summary requester.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// The requester is single-shot and already left the idle state.
    #[error("summary was already requested")]
    AlreadyIssued,

    /// The text-generation call failed.
    #[error(transparent)]
    Generation(#[from] AiLlmError),
}

impl From<reqwest::Error> for DirectoryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return DirectoryError::Timeout;
        }
        if e.is_decode() {
            return DirectoryError::Parse(e.to_string());
        }
        DirectoryError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for DirectoryError {
    fn from(e: serde_json::Error) -> Self {
        DirectoryError::Parse(e.to_string())
    }
}
