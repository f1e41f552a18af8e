//! Game repository trait definition.
//!
//! This port defines the interface for the local game table.
//! Implementations must handle all storage details internally.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{Game, GameChange, GameQuery, GameUpdate, NewGame};

/// Repository for local game rows.
///
/// # Design Rules
///
/// - No storage-engine types in signatures
/// - Row-oriented: select with filter, insert, update, batch variants, count
/// - Relevance, merge and refresh policy belong in the services, not here
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Get a game by its internal id.
    async fn get_by_id(&self, id: i64) -> Result<Option<Game>, RepositoryError>;

    /// Get a game by its external (catalog) id.
    async fn get_by_igdb_id(&self, igdb_id: i64) -> Result<Option<Game>, RepositoryError>;

    /// Get a game by slug.
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Game>, RepositoryError>;

    /// Fetch every row whose external id is in `igdb_ids`, in one query.
    async fn find_by_igdb_ids(&self, igdb_ids: &[i64]) -> Result<Vec<Game>, RepositoryError>;

    /// Substring + containment search over local rows.
    async fn search(&self, query: &GameQuery) -> Result<Vec<Game>, RepositoryError>;

    /// Rows with at least one user rating, most rated first, then best
    /// average.
    async fn popular(&self, limit: usize) -> Result<Vec<Game>, RepositoryError>;

    /// Rows that have an external id and are missing cover, summary,
    /// developer or release date, or were never synced. Most catalog
    /// ratings first.
    async fn list_incomplete(&self, limit: usize) -> Result<Vec<Game>, RepositoryError>;

    /// Insert one row.
    ///
    /// Returns `Err(RepositoryError::AlreadyExists)` when a row with the same
    /// external id exists. A slug collision with a different game is
    /// resolved by the implementation (suffixing the external id).
    async fn insert(&self, game: &NewGame) -> Result<Game, RepositoryError>;

    /// Insert many rows atomically: either all rows are written or none.
    ///
    /// Returns the number of inserted rows.
    async fn insert_many(&self, games: &[NewGame]) -> Result<usize, RepositoryError>;

    /// Apply a change to one row, addressed by internal id.
    ///
    /// Returns `Err(RepositoryError::NotFound)` if the row doesn't exist.
    async fn update(&self, id: i64, change: &GameChange) -> Result<(), RepositoryError>;

    /// Apply changes to many rows atomically, keyed on the unique external
    /// id. Returns the number of updated rows.
    async fn update_many(&self, updates: &[GameUpdate]) -> Result<usize, RepositoryError>;

    /// Total number of rows.
    async fn count(&self) -> Result<u64, RepositoryError>;
}
