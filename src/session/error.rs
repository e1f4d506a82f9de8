//! Session store error types

use thiserror::Error;

/// Errors raised while persisting session state
#[derive(Error, Debug)]
pub enum SessionError {
    /// Reading or writing the backing file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Session contents could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Serialization(err.to_string())
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
