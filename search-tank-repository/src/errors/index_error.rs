//! Index error types.
//!
//! This module defines the closed set of failures an index operation can
//! report. Callers can branch on every variant.

use thiserror::Error;

/// Errors that can occur during index operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    /// Creation requested for a name that is already provisioned.
    #[error("Index already exists: {0}")]
    AlreadyExists(String),

    /// The named index does not exist for this account.
    #[error("Index not found: {0}")]
    NotFound(String),

    /// The account reached its index limit.
    #[error("Index quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The server rejected a query or scoring function expression.
    #[error("Invalid syntax: {0}")]
    InvalidSyntax(String),

    /// The request was rejected before or by the server because an argument is invalid.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Temporary server-side failure. Safe to retry.
    #[error("Unexpected status {status} from server: {message}")]
    TransientServerFault { status: u16, message: String },

    /// The index exists but has not finished starting.
    #[error("Index not started yet: {0}")]
    ServiceNotReady(String),

    /// Connection, timeout or (de)serialization failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Batch size exceeds configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },
}

impl IndexError {
    /// Create an already-exists error.
    pub fn already_exists(name: impl Into<String>) -> Self {
        Self::AlreadyExists(name.into())
    }

    /// Create a not-found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a quota-exceeded error.
    pub fn quota_exceeded(msg: impl Into<String>) -> Self {
        Self::QuotaExceeded(msg.into())
    }

    /// Create an invalid syntax error.
    pub fn invalid_syntax(msg: impl Into<String>) -> Self {
        Self::InvalidSyntax(msg.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a transient server fault for an unexpected status code.
    pub fn server_fault(status: u16, msg: impl Into<String>) -> Self {
        Self::TransientServerFault {
            status,
            message: msg.into(),
        }
    }

    /// Create a not-started error.
    pub fn service_not_ready(name: impl Into<String>) -> Self {
        Self::ServiceNotReady(name.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }

    /// Whether retrying the same call may succeed.
    ///
    /// Retry policy itself is left to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransientServerFault { .. } | Self::ServiceNotReady(_) | Self::Transport(_)
        )
    }
}

impl From<reqwest::Error> for IndexError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for IndexError {
    fn from(err: serde_json::Error) -> Self {
        Self::Transport(format!("serialization failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(IndexError::server_fault(500, "boom").is_retryable());
        assert!(IndexError::service_not_ready("catalog").is_retryable());
        assert!(IndexError::transport("connection reset").is_retryable());

        assert!(!IndexError::not_found("catalog").is_retryable());
        assert!(!IndexError::already_exists("catalog").is_retryable());
        assert!(!IndexError::invalid_syntax("bad").is_retryable());
        assert!(!IndexError::batch_size_exceeded(10, 5).is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            IndexError::server_fault(502, "bad gateway").to_string(),
            "Unexpected status 502 from server: bad gateway"
        );
        assert_eq!(
            IndexError::batch_size_exceeded(10, 5).to_string(),
            "Batch size 10 exceeds maximum 5"
        );
    }
}
