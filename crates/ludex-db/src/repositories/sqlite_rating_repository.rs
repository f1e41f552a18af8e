//! `SQLite` implementation of the `RatingRepository` trait.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use ludex_core::{NewRating, RatingRepository, RepositoryError, Review, Reviewer};

use super::row_mappers::{format_timestamp, row_to_review, storage_error};

const REVIEW_SELECT: &str = "SELECT r.id, r.game_id, r.user_id, r.rating, r.review, r.created_at, \
     u.username, u.display_name, u.avatar_url \
     FROM ratings r JOIN users u ON u.id = r.user_id";

/// `SQLite` implementation of the `RatingRepository` trait.
pub struct SqliteRatingRepository {
    pool: SqlitePool,
}

impl SqliteRatingRepository {
    /// Create a new `SQLite` rating repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a user who can author reviews.
    pub async fn add_user(
        &self,
        username: &str,
        display_name: Option<&str>,
    ) -> Result<Reviewer, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, display_name, created_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(username)
        .bind(display_name)
        .bind(format_timestamp(Utc::now()))
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(Reviewer {
            id,
            username: username.to_string(),
            display_name: display_name.map(str::to_string),
            avatar_url: None,
        })
    }
}

#[async_trait]
impl RatingRepository for SqliteRatingRepository {
    async fn reviews_for_game(&self, game_id: i64) -> Result<Vec<Review>, RepositoryError> {
        let query = format!("{REVIEW_SELECT} WHERE r.game_id = ? ORDER BY r.created_at DESC, r.id DESC");
        let rows = sqlx::query(&query)
            .bind(game_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;
        rows.iter().map(row_to_review).collect()
    }

    async fn add_rating(&self, rating: &NewRating) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let game: Option<i64> = sqlx::query_scalar("SELECT id FROM games WHERE id = ?")
            .bind(rating.game_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_error)?;
        if game.is_none() {
            return Err(RepositoryError::NotFound(format!("game {}", rating.game_id)));
        }
        let user: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
            .bind(rating.user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_error)?;
        if user.is_none() {
            return Err(RepositoryError::NotFound(format!("user {}", rating.user_id)));
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO ratings (user_id, game_id, rating, review, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(rating.user_id)
        .bind(rating.game_id)
        .bind(rating.rating)
        .bind(&rating.review)
        .bind(format_timestamp(Utc::now()))
        .fetch_one(&mut *tx)
        .await
        .map_err(storage_error)?;

        // Keep the denormalized aggregate on the game row in step.
        sqlx::query(
            "UPDATE games SET \
             user_rating_avg = (SELECT AVG(rating) FROM ratings WHERE game_id = ?1), \
             user_rating_count = (SELECT COUNT(*) FROM ratings WHERE game_id = ?1) \
             WHERE id = ?1",
        )
        .bind(rating.game_id)
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?;

        let query = format!("{REVIEW_SELECT} WHERE r.id = ?");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(storage_error)?;
        let review = row_to_review(&row)?;

        tx.commit().await.map_err(storage_error)?;
        Ok(review)
    }

    async fn count_for_game(&self, game_id: i64) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ratings WHERE game_id = ?")
            .bind(game_id)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
