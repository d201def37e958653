//! Error types for the access layer.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

/// Errors surfaced by the access layer.
///
/// Reads that find nothing are not errors: they return an empty or absent
/// value. Everything here propagates synchronously to the caller; nothing is
/// retried or swallowed.
#[derive(Debug, thiserror::Error)]
pub enum DbAccessError {
    /// Unknown backend tag passed to the factory
    #[error("unknown access mode '{0}', expected 'db' or 'rest'")]
    Configuration(String),

    /// Login handshake or credential failure
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// A mutating call was rejected; carries the server message
    #[error("request failed: {0}")]
    Request(String),

    /// An expected resource is absent
    #[error("{0} not found")]
    NotFound(String),

    /// Session lifecycle failure: logout rejected, or an operation issued
    /// on a backend that is not connected
    #[error("connection error: {0}")]
    Connection(String),
}

/// Convenience type alias for Results with DbAccessError.
pub type DbResult<T> = Result<T, DbAccessError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for DbAccessError {
    fn from(err: serde_json::Error) -> Self {
        DbAccessError::Request(format!("malformed payload: {}", err))
    }
}

impl From<reqwest::Error> for DbAccessError {
    fn from(err: reqwest::Error) -> Self {
        DbAccessError::Request(err.to_string())
    }
}
