//! CLI-specific error types and mappings.
//!
//! Maps `CoreError` and adapter failures to exit codes and user-facing
//! messages.

use ludex_core::{CatalogError, CoreError, RepositoryError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Core domain error.
    #[error("{0}")]
    Core(String),

    /// Argument parsing or validation error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Requested game does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// The remote catalog could not be reached or refused the call.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

impl CliError {
    /// Map error to a sysexits-style exit code.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Core(_) => 1,
            Self::Arguments(_) => 64,   // EX_USAGE
            Self::NotFound(_) => 66,    // EX_NOINPUT
            Self::Unavailable(_) => 69, // EX_UNAVAILABLE
            Self::Io(_) => 74,          // EX_IOERR
            Self::Database(_) => 73,    // EX_CANTCREAT (closest fit)
            Self::Config(_) => 78,      // EX_CONFIG
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Repository(RepositoryError::NotFound(what)) => Self::NotFound(what),
            CoreError::Repository(repo_err) => Self::Database(repo_err.to_string()),
            CoreError::Catalog(catalog_err) => catalog_err.into(),
            CoreError::Validation(msg) => Self::Arguments(msg),
            CoreError::Configuration(msg) => Self::Config(msg),
            CoreError::Internal(msg) => Self::Core(msg),
        }
    }
}

impl From<CatalogError> for CliError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { id } => Self::NotFound(format!("catalog entry {id}")),
            CatalogError::AuthRequired { .. } | CatalogError::Configuration { .. } => {
                Self::Config(err.to_string())
            }
            _ => Self::Unavailable(err.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_exit_codes() {
        let missing: CliError = CoreError::from(RepositoryError::NotFound("game 9".into())).into();
        assert_eq!(missing.exit_code(), 66);

        let storage: CliError = CoreError::from(RepositoryError::Storage("locked".into())).into();
        assert_eq!(storage.exit_code(), 73);

        let invalid: CliError = CoreError::Validation("limit must be positive".into()).into();
        assert_eq!(invalid.exit_code(), 64);
    }

    #[test]
    fn test_catalog_errors_split_config_from_outage() {
        let auth: CliError = CatalogError::AuthRequired {
            message: "expired".into(),
        }
        .into();
        assert_eq!(auth.exit_code(), 78);

        let down: CliError = CoreError::from(CatalogError::RateLimited).into();
        assert_eq!(down.exit_code(), 69);
    }
}
