//! Vitrine error types

use std::time::Duration;

/// Vitrine error types
#[derive(Debug, thiserror::Error)]
pub enum VitrineError {
    // Network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The requested view needs a signed-in caller and none is present.
    #[error("authentication required")]
    AuthRequired,

    // Data errors
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The background task driving a load panicked or was aborted.
    #[error("load task failed: {0}")]
    Task(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for Vitrine operations
pub type Result<T> = std::result::Result<T, VitrineError>;
