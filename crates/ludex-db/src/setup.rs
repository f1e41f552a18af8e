//! Database setup and initialization.
//!
//! This module provides the `setup_database()` function for initializing
//! the `SQLite` database with full schema. Entry points call this with the
//! resolved database path.

use anyhow::Result;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use std::path::Path;
use tracing::debug;

/// Sets up the `SQLite` database connection and ensures the schema exists.
///
/// Creates the parent directory and the database file when missing, then
/// creates every table and index.
///
/// # Errors
///
/// Returns an error if the database file cannot be opened or created, or if
/// schema creation fails.
///
/// # Example
///
/// ```rust,no_run
/// use ludex_db::setup_database;
/// use std::path::Path;
///
/// # async fn example() -> anyhow::Result<()> {
/// let pool = setup_database(Path::new("/path/to/ludex.db")).await?;
/// # Ok(())
/// # }
/// ```
pub async fn setup_database(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = SqlitePool::connect_with(
        SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true),
    )
    .await?;

    create_schema(&pool).await?;
    debug!(path = %db_path.display(), "Database ready");

    Ok(pool)
}

/// Sets up an in-memory `SQLite` database for testing.
///
/// Creates a fresh in-memory database with the full production schema. The
/// pool holds a single connection because every in-memory connection is its
/// own database.
#[cfg(any(test, feature = "test-utils"))]
pub async fn setup_test_database() -> Result<SqlitePool> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(
            SqliteConnectOptions::new()
                .in_memory(true)
                .foreign_keys(true),
        )
        .await?;
    create_schema(&pool).await?;
    Ok(pool)
}

/// Creates the complete database schema.
///
/// Safe to call multiple times as all statements use IF NOT EXISTS.
pub(crate) async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // List-valued columns hold JSON arrays.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS games (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            igdb_id INTEGER NOT NULL UNIQUE,
            slug TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            summary TEXT,
            description TEXT,
            release_date TEXT,
            cover_url TEXT,
            screenshots TEXT NOT NULL DEFAULT '[]',
            genres TEXT NOT NULL DEFAULT '[]',
            platforms TEXT NOT NULL DEFAULT '[]',
            developer TEXT,
            publisher TEXT,
            total_rating REAL,
            aggregated_rating REAL,
            rating_count INTEGER,
            category INTEGER,
            parent_game INTEGER,
            franchise TEXT,
            collection TEXT,
            alternative_names TEXT NOT NULL DEFAULT '[]',
            similar_game_ids TEXT NOT NULL DEFAULT '[]',
            dlc_ids TEXT NOT NULL DEFAULT '[]',
            expansion_ids TEXT NOT NULL DEFAULT '[]',
            user_rating_avg REAL,
            user_rating_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            last_synced TEXT,
            data_source TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_games_name ON games(name COLLATE NOCASE)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_games_rating_count ON games(rating_count)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            display_name TEXT,
            avatar_url TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ratings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            game_id INTEGER NOT NULL,
            rating REAL NOT NULL,
            review TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (game_id) REFERENCES games(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_ratings_game ON ratings(game_id, created_at)")
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_setup_creates_file_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ludex.db");

        let pool = setup_database(&path).await.unwrap();
        create_schema(&pool).await.unwrap();

        assert!(path.exists());
        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert!(tables.contains(&"games".to_string()));
        assert!(tables.contains(&"ratings".to_string()));
        assert!(tables.contains(&"users".to_string()));
    }
}
