//! Rating repository trait definition.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{NewRating, Review};

/// Repository for user ratings and reviews.
///
/// Reviews are returned joined with their author from the user table.
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// All reviews for a game, newest first.
    async fn reviews_for_game(&self, game_id: i64) -> Result<Vec<Review>, RepositoryError>;

    /// Record a rating and refresh the game's denormalized rating aggregate.
    ///
    /// Returns `Err(RepositoryError::NotFound)` if the user or game doesn't
    /// exist.
    async fn add_rating(&self, rating: &NewRating) -> Result<Review, RepositoryError>;

    /// Number of ratings recorded for a game.
    async fn count_for_game(&self, game_id: i64) -> Result<u64, RepositoryError>;
}
