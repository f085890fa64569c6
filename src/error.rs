//! Error types for Feed Courier.

use thiserror::Error;

/// Common error type for Feed Courier.
#[derive(Error, Debug)]
pub enum CourierError {
    /// Validation error for a submitted feed entry.
    #[error("validation error: {0}")]
    Validation(String),

    /// Authentication error (missing or wrong API key).
    #[error("authentication error: {0}")]
    Auth(String),

    /// Webhook dispatch error.
    #[error("dispatch error: {0}")]
    Dispatch(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend error.
    ///
    /// This is a generic storage error that wraps errors from any backend.
    /// Errors from sqlx are automatically converted.
    #[error("storage error: {0}")]
    Storage(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for CourierError {
    fn from(e: sqlx::Error) -> Self {
        CourierError::Storage(e.to_string())
    }
}

/// Result type alias for Feed Courier operations.
pub type Result<T> = std::result::Result<T, CourierError>;
