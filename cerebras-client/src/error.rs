//! Error types for provider calls.

use std::time::Duration;
use thiserror::Error;

/// Errors returned by the text-completion provider.
#[derive(Error, Debug)]
pub enum ClientError {
    /// API key missing, invalid, or rejected
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Provider asked us to back off
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Request was malformed from the provider's point of view
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Provider-side failure
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Connection-level failure
    #[error("network error: {0}")]
    Network(String),

    /// Request exceeded the configured deadline
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Response body did not match the expected completion shape
    #[error("unexpected response shape: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Whether retrying the same call can reasonably succeed.
    ///
    /// Authentication and request-shape problems are permanent; everything
    /// network- or load-related is worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClientError::RateLimited(_)
                | ClientError::Server { .. }
                | ClientError::Network(_)
                | ClientError::Timeout(_)
        )
    }
}

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Map an HTTP error status and body to a typed error.
pub fn error_from_status(status: u16, body: &str) -> ClientError {
    match status {
        401 | 403 => ClientError::AuthenticationFailed(body.to_string()),
        429 => ClientError::RateLimited(body.to_string()),
        400 => ClientError::InvalidRequest(body.to_string()),
        500..=599 => ClientError::Server {
            status,
            message: body.to_string(),
        },
        _ => ClientError::InvalidResponse(format!("HTTP {}: {}", status, body)),
    }
}
