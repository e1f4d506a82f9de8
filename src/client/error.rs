//! API client error types
//!
//! Every failure of a request surfaces as one [`ApiError`] carrying a
//! human-readable message and, when a response arrived, its status code.

use crate::session::SessionError;
use thiserror::Error;

/// Message used when a response body cannot be decoded
pub const INVALID_BODY_MESSAGE: &str = "invalid response body";

/// Errors returned by the storefront API client
#[derive(Error, Debug)]
pub enum ApiError {
    /// No usable response arrived (connection refused, DNS, timeout)
    #[error("Request failed: {message}")]
    Transport { message: String },

    /// A successful response whose body is not the expected JSON
    #[error("{message}")]
    Decode {
        message: String,
        status_code: Option<u16>,
    },

    /// The server answered with a non-2xx status
    #[error("{message}")]
    Status { message: String, status_code: u16 },

    /// The request could not be built (unserializable body, bad header value)
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Persisting the session failed after a successful call
    #[error("Session storage error: {0}")]
    Session(#[from] SessionError),
}

impl ApiError {
    pub(crate) fn decode(status_code: Option<u16>) -> Self {
        ApiError::Decode {
            message: INVALID_BODY_MESSAGE.to_string(),
            status_code,
        }
    }

    /// Status error using the server's `detail` when it gave one
    pub(crate) fn status(status_code: u16, detail: Option<String>) -> Self {
        ApiError::Status {
            message: detail
                .unwrap_or_else(|| format!("Request failed with status {}", status_code)),
            status_code,
        }
    }

    /// Human-readable message
    pub fn message(&self) -> String {
        match self {
            ApiError::Transport { message }
            | ApiError::Decode { message, .. }
            | ApiError::Status { message, .. }
            | ApiError::InvalidRequest { message } => message.clone(),
            ApiError::Session(e) => e.to_string(),
        }
    }

    /// HTTP status of the response, when one arrived
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Decode { status_code, .. } => *status_code,
            ApiError::Status { status_code, .. } => Some(*status_code),
            ApiError::Transport { .. } | ApiError::InvalidRequest { .. } | ApiError::Session(_) => {
                None
            }
        }
    }

    /// Whether the server rejected the credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status_code(), Some(401) | Some(403))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("service unavailable: {}", err)
        } else {
            err.to_string()
        };
        ApiError::Transport { message }
    }
}
