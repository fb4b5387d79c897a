//! Error types
//!
//! Report parsing and feedback generation errors are absorbed where they
//! occur; store errors travel up to the controller, which turns them into a
//! "try again" reply.

use thiserror::Error;

/// Validation failures for a submitted daily report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Insufficient answers: expected 6 lines, got {got}")]
    InsufficientAnswers { got: usize },

    #[error("Malformed answers: {0}")]
    MalformedAnswers(String),
}

/// Failures of the external text-generation call.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("MISTRAL_API_KEY not set - generation unavailable")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generation API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Generation API returned no text")]
    EmptyResponse,

    #[error("Generation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Persistence failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}
