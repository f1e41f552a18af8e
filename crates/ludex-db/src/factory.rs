//! Composition utilities for building `LudexCore` with `SQLite` backends.
//!
//! This module provides factory functions for wiring up the application
//! with `SQLite` repositories. It is focused purely on construction and
//! should not contain any domain logic.

use sqlx::SqlitePool;
use std::sync::Arc;

use ludex_core::{CatalogPort, CoreConfig, LudexCore, Repos};

use crate::repositories::{SqliteGameRepository, SqliteRatingRepository};

/// Factory for creating repository instances with `SQLite` backends.
///
/// This struct provides composition utilities only, no domain logic.
pub struct CoreFactory;

impl CoreFactory {
    /// Build all `SQLite` repositories from a pool.
    ///
    /// This is the recommended way for adapters to obtain repositories.
    /// Returns a `Repos` struct from `ludex-core` containing trait-object-wrapped
    /// repositories.
    pub fn build_repos(pool: SqlitePool) -> Repos {
        Repos::new(
            Arc::new(SqliteGameRepository::new(pool.clone())),
            Arc::new(SqliteRatingRepository::new(pool)),
        )
    }

    /// Build a complete `LudexCore` from a pool and a remote catalog.
    ///
    /// Equivalent to:
    ///
    /// ```ignore
    /// let repos = CoreFactory::build_repos(pool);
    /// let core = LudexCore::new(repos, catalog, config);
    /// ```
    ///
    /// Must be called inside a tokio runtime so the sync queue can start.
    pub fn build_core(
        pool: SqlitePool,
        catalog: Arc<dyn CatalogPort>,
        config: CoreConfig,
    ) -> LudexCore {
        LudexCore::new(Self::build_repos(pool), catalog, config)
    }

    /// Create a game repository from a pool.
    pub fn game_repository(pool: SqlitePool) -> Arc<SqliteGameRepository> {
        Arc::new(SqliteGameRepository::new(pool))
    }

    /// Create a rating repository from a pool.
    pub fn rating_repository(pool: SqlitePool) -> Arc<SqliteRatingRepository> {
        Arc::new(SqliteRatingRepository::new(pool))
    }
}

/// Test database helper for integration tests.
///
/// Provides an in-memory `SQLite` database with the production schema
/// already applied.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestDb {
    pool: SqlitePool,
}

#[cfg(any(test, feature = "test-utils"))]
impl TestDb {
    /// Create a new in-memory test database with full schema.
    pub async fn new() -> anyhow::Result<Self> {
        let pool = crate::setup::setup_test_database().await?;
        Ok(Self { pool })
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create a game repository using this test database.
    pub fn game_repository(&self) -> SqliteGameRepository {
        SqliteGameRepository::new(self.pool.clone())
    }

    /// Create a rating repository using this test database.
    pub fn rating_repository(&self) -> SqliteRatingRepository {
        SqliteRatingRepository::new(self.pool.clone())
    }

    /// All repositories, wired for `LudexCore`.
    pub fn repos(&self) -> Repos {
        CoreFactory::build_repos(self.pool.clone())
    }
}
