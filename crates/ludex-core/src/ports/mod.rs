//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` or `reqwest` types in any signature
//! - Repository traits are minimal and row-oriented
//! - The catalog port is read-only

pub mod catalog;
pub mod game_repository;
pub mod rating_repository;

use std::sync::Arc;
use thiserror::Error;

pub use catalog::{CatalogError, CatalogPort, CatalogResult};
pub use game_repository::GameRepository;
pub use rating_repository::RatingRepository;

/// Container for all repository trait objects.
///
/// This struct provides a consistent way to wire repositories across adapters
/// without coupling them to concrete implementations.
///
/// # Example
///
/// ```ignore
/// // In ludex-db factory:
/// let repos = ludex_db::CoreFactory::build_repos(&pool);
/// let sync = GameSyncService::new(repos.games.clone(), SyncConfig::default());
/// ```
#[derive(Clone)]
pub struct Repos {
    /// Game repository for the local catalog.
    pub games: Arc<dyn GameRepository>,
    /// Rating repository for user ratings and reviews.
    pub ratings: Arc<dyn RatingRepository>,
}

impl Repos {
    /// Create a new Repos container.
    pub fn new(games: Arc<dyn GameRepository>, ratings: Arc<dyn RatingRepository>) -> Self {
        Self { games, ratings }
    }
}

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for services to handle storage failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An entity with the same identifier already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Storage backend error (database, filesystem, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A constraint was violated (e.g., foreign key, check constraint).
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl RepositoryError {
    /// Duplicate-key conflicts are expected when two paths persist the same
    /// game concurrently.
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

/// Core error type for semantic domain errors.
///
/// This is the canonical error type used across the core domain.
/// Adapters should map this to their own error types (CLI exit codes,
/// HTTP status codes). It is `Clone` so a single in-flight result can be
/// handed to every caller waiting on it.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Remote catalog operation failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Validation error (invalid input).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error (unexpected condition).
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_detection() {
        assert!(RepositoryError::AlreadyExists("igdb_id=1".into()).is_duplicate());
        assert!(!RepositoryError::Storage("disk full".into()).is_duplicate());
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err = CoreError::from(RepositoryError::NotFound("game 7".into()));
        assert_eq!(err.to_string(), "Not found: game 7");
    }
}
