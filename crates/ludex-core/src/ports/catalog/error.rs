//! Error types for remote catalog port operations.

use thiserror::Error;

/// Errors from remote catalog port operations.
///
/// These are domain-level errors that consumers can handle.
/// Implementation-specific errors (HTTP, JSON) are mapped to these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The requested entry does not exist in the catalog.
    #[error("Catalog entry not found: {id}")]
    NotFound {
        /// The external id that wasn't found
        id: i64,
    },

    /// API rate limit exceeded.
    #[error("Rate limit exceeded, try again later")]
    RateLimited,

    /// Credentials missing, expired or rejected.
    #[error("Catalog authentication failed: {message}")]
    AuthRequired {
        /// What the catalog reported
        message: String,
    },

    /// Network or connectivity error.
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error
        message: String,
    },

    /// The call did not complete within its deadline.
    #[error("Catalog request timed out after {elapsed_ms}ms")]
    Timeout {
        /// Deadline that was exceeded, in milliseconds
        elapsed_ms: u64,
    },

    /// Invalid response from the API.
    #[error("Invalid catalog response: {message}")]
    InvalidResponse {
        /// What was invalid
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What's wrong with the configuration
        message: String,
    },

    /// The circuit breaker rejected the call without attempting it.
    #[error("Catalog circuit is open; request not attempted")]
    CircuitOpen,
}

impl CatalogError {
    /// Whether the failure says something about the catalog's health.
    ///
    /// Only these count against the circuit breaker; a missing entry or a
    /// rejected call does not.
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited
                | Self::Network { .. }
                | Self::Timeout { .. }
                | Self::InvalidResponse { .. }
        )
    }
}

/// Result type alias for remote catalog port operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
