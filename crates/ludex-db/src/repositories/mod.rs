//! Repository implementations using `SQLite`.
//!
//! These implementations encapsulate all SQL queries and database access.
//! The `SqlitePool` is confined to this module and never exposed through
//! the port trait signatures.

mod row_mappers;
mod sqlite_game_repository;
mod sqlite_rating_repository;

pub use sqlite_game_repository::SqliteGameRepository;
pub use sqlite_rating_repository::SqliteRatingRepository;
