//! Internal error types for IGDB operations.
//!
//! These errors are internal to `ludex-igdb` and are mapped to core port
//! errors at the boundary.

use thiserror::Error;

/// Result type alias for IGDB operations.
pub type IgdbResult<T> = Result<T, IgdbError>;

/// Errors related to IGDB API operations.
#[derive(Debug, Error)]
pub enum IgdbError {
    /// API request failed with an HTTP error status.
    #[error("IGDB request to {endpoint} failed with status {status}")]
    ApiRequestFailed {
        /// HTTP status code
        status: u16,
        /// The endpoint that was queried
        endpoint: String,
    },

    /// API returned an invalid or unexpected response.
    #[error("Invalid response from IGDB: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// The request did not complete within the client timeout.
    #[error("IGDB request timed out after {elapsed_ms}ms")]
    Timeout {
        /// Configured timeout in milliseconds
        elapsed_ms: u64,
    },

    /// Client id or access token missing.
    #[error("IGDB credentials are not configured")]
    MissingCredentials,

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl IgdbError {
    /// Server errors and transport failures are worth another attempt.
    pub(crate) fn is_retryable(&self) -> bool {
        match self {
            Self::ApiRequestFailed { status, .. } => *status >= 500,
            Self::Network(_) | Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_request_failed_error_message() {
        let error = IgdbError::ApiRequestFailed {
            status: 429,
            endpoint: "games".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("games"));
    }

    #[test]
    fn test_retryable_classification() {
        let server = IgdbError::ApiRequestFailed {
            status: 503,
            endpoint: "games".to_string(),
        };
        let client = IgdbError::ApiRequestFailed {
            status: 400,
            endpoint: "games".to_string(),
        };
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert!(IgdbError::Timeout { elapsed_ms: 10 }.is_retryable());
        assert!(!IgdbError::MissingCredentials.is_retryable());
    }
}
