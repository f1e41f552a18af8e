//! `SQLite` persistence for ludex.
//!
//! Implements the `GameRepository` and `RatingRepository` ports from
//! `ludex-core` on top of `sqlx`, plus schema setup and a composition
//! factory for adapters.

#![deny(unsafe_code)]

pub mod factory;
pub mod repositories;
pub mod setup;

// Re-export factory for convenient access
pub use factory::CoreFactory;

// Re-export TestDb for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub use factory::TestDb;

pub use repositories::{SqliteGameRepository, SqliteRatingRepository};

// Re-export setup functions for convenient access
pub use setup::setup_database;
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
