//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! infrastructure concerns (database, HTTP, etc.).
//!
//! # Structure
//!
//! - `catalog` - Remote catalog records (`CatalogEntry`, `InvolvedCompany`)
//! - `game` - Local rows and updates (`Game`, `NewGame`, `GamePatch`)
//! - `search` - Search filters, local queries and results
//! - `review` - User ratings joined with their authors

mod catalog;
mod game;
mod review;
mod search;

pub use catalog::{CatalogCategory, CatalogEntry, InvolvedCompany};
pub use game::{Game, GameChange, GamePatch, GameUpdate, NewGame, is_blank};
pub use review::{GameWithReviews, NewRating, Review, Reviewer};
pub use search::{GameOrigin, GameQuery, SearchFilters, SearchResult};

/// Reference to a local game by internal id or slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameRef {
    Id(i64),
    Slug(String),
}

impl GameRef {
    /// Interpret an identifier string: all digits means an id, anything
    /// else is a slug.
    pub fn parse(identifier: &str) -> Self {
        identifier
            .parse::<i64>()
            .map_or_else(|_| Self::Slug(identifier.to_string()), Self::Id)
    }
}

impl std::fmt::Display for GameRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id:{id}"),
            Self::Slug(slug) => write!(f, "slug:{slug}"),
        }
    }
}
