//! Error types for the Campus API client

use thiserror::Error;

/// Errors that can occur when talking to the Campus backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No active session; the request was not sent
    #[error("No active session")]
    Unauthenticated,

    /// The backend rejected the bearer token
    #[error("Unauthorized - session expired or invalid")]
    Unauthorized,

    /// HTTP request failed before a response arrived
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The request timed out
    #[error("Request timed out")]
    Timeout,

    /// Response body could not be decoded
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Backend returned a non-success status
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message from the backend
        message: String,
    },
}

impl ApiError {
    /// Whether repeating the same request may succeed
    ///
    /// Transport failures, timeouts, rate limiting and 5xx responses are
    /// retryable; everything else is permanent.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::Timeout => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Unauthenticated | Self::Unauthorized | Self::ResponseParseFailed(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        let error = ApiError::Status {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert!(error.is_retryable());
        assert!(ApiError::Timeout.is_retryable());
    }

    #[test]
    fn client_errors_are_permanent() {
        let error = ApiError::Status {
            status: 422,
            message: "cart is empty".to_string(),
        };
        assert!(!error.is_retryable());
        assert!(!ApiError::Unauthorized.is_retryable());
    }

    #[test]
    fn status_error_display() {
        let error = ApiError::Status {
            status: 402,
            message: "card declined".to_string(),
        };
        assert_eq!(error.to_string(), "API error (status 402): card declined");
    }
}
