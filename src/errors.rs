//! Error types for sketchbuddy
//!
//! One taxonomy for both request modes: transport-open failures are raised
//! before any fragment is produced, mid-stream failures terminate an already
//! running fragment sequence, and the buffered mode converts whatever it hit
//! into a data-shaped reply instead of propagating.

use thiserror::Error;

/// Main error type for the chat client
#[derive(Error, Debug)]
pub enum ChatError {
    /// Connection-level failure before any response byte was read
    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("API returned status {status}: {detail}")]
    ApiStatus { status: u16, detail: String },

    /// Successful status but the response body could not be read
    #[error("response body missing or unreadable")]
    BodyMissing,

    /// Transport failure after partial delivery; fragments already
    /// delivered stay delivered
    #[error("stream interrupted: {0}")]
    MidStream(String),

    /// Attempt bound reached without a captured failure to report
    #[error("request failed, please try again later")]
    RetryExhausted,

    /// JSON decode errors outside the per-record stream path
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for chat client operations
pub type Result<T> = std::result::Result<T, ChatError>;
