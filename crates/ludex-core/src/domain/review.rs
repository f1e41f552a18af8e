//! User rating and review types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::game::Game;

/// The author of a review, joined from the user table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reviewer {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// A user-submitted rating, optionally with review text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub game_id: i64,
    /// Rating on the local 0–10 scale.
    pub rating: f64,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author: Reviewer,
}

/// A rating that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRating {
    pub user_id: i64,
    pub game_id: i64,
    pub rating: f64,
    pub review: Option<String>,
}

/// A game joined with all of its reviews, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameWithReviews {
    pub game: Game,
    pub reviews: Vec<Review>,
}
