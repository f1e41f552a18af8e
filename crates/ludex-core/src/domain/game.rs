//! Local game record types.
//!
//! These types represent rows of the local game table, independent of the
//! storage technology behind the `GameRepository` port.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::CatalogCategory;

// ─────────────────────────────────────────────────────────────────────────────
// Persisted Game
// ─────────────────────────────────────────────────────────────────────────────

/// A game persisted in the local store.
///
/// `igdb_id` and `slug` are both unique across the table. Use `NewGame` for
/// rows that have not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Internal database id.
    pub id: i64,
    /// External (remote catalog) id.
    pub igdb_id: i64,
    /// URL-safe unique name.
    pub slug: String,
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub cover_url: Option<String>,
    pub screenshots: Vec<String>,
    pub genres: Vec<String>,
    pub platforms: Vec<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    /// Catalog total rating (0–100).
    pub total_rating: Option<f64>,
    /// Catalog critic rating (0–100).
    pub aggregated_rating: Option<f64>,
    /// Number of catalog ratings behind `total_rating`.
    pub rating_count: Option<u32>,
    pub category: Option<CatalogCategory>,
    pub parent_game: Option<i64>,
    pub franchise: Option<String>,
    pub collection: Option<String>,
    pub alternative_names: Vec<String>,
    pub similar_game_ids: Vec<i64>,
    pub dlc_ids: Vec<i64>,
    pub expansion_ids: Vec<i64>,
    /// Average of local user ratings (denormalized from the rating table).
    pub user_rating_avg: Option<f64>,
    /// Number of local user ratings (denormalized from the rating table).
    pub user_rating_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Last time the row was refreshed from the remote catalog.
    pub last_synced: Option<DateTime<Utc>>,
    /// Which path last wrote the row (e.g. `search_sync`, `backfill`).
    pub data_source: Option<String>,
}

impl Game {
    /// A record is incomplete when summary, developer or publisher is empty.
    ///
    /// Incomplete records are refreshed from the remote catalog on the next
    /// external-id read.
    pub fn is_incomplete(&self) -> bool {
        is_blank(self.summary.as_deref())
            || is_blank(self.developer.as_deref())
            || is_blank(self.publisher.as_deref())
    }

    /// Whether the row was last updated more than `window` before `now`.
    pub fn is_stale(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        now - self.updated_at > window
    }
}

/// Treat `None`, empty and whitespace-only strings alike.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// New Game
// ─────────────────────────────────────────────────────────────────────────────

/// A game ready to be inserted (or to fully replace an existing row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGame {
    pub igdb_id: i64,
    pub slug: String,
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub cover_url: Option<String>,
    pub screenshots: Vec<String>,
    pub genres: Vec<String>,
    pub platforms: Vec<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub total_rating: Option<f64>,
    pub aggregated_rating: Option<f64>,
    pub rating_count: Option<u32>,
    pub category: Option<CatalogCategory>,
    pub parent_game: Option<i64>,
    pub franchise: Option<String>,
    pub collection: Option<String>,
    pub alternative_names: Vec<String>,
    pub similar_game_ids: Vec<i64>,
    pub dlc_ids: Vec<i64>,
    pub expansion_ids: Vec<i64>,
    pub last_synced: Option<DateTime<Utc>>,
    pub data_source: Option<String>,
}

impl NewGame {
    /// Create a new game with only the identity fields set.
    pub fn new(igdb_id: i64, slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            igdb_id,
            slug: slug.into(),
            name: name.into(),
            summary: None,
            description: None,
            release_date: None,
            cover_url: None,
            screenshots: Vec::new(),
            genres: Vec::new(),
            platforms: Vec::new(),
            developer: None,
            publisher: None,
            total_rating: None,
            aggregated_rating: None,
            rating_count: None,
            category: None,
            parent_game: None,
            franchise: None,
            collection: None,
            alternative_names: Vec::new(),
            similar_game_ids: Vec::new(),
            dlc_ids: Vec::new(),
            expansion_ids: Vec::new(),
            last_synced: None,
            data_source: None,
        }
    }

    /// Materialize this row as a persisted `Game`.
    ///
    /// Used by repository implementations after assigning the id.
    pub fn into_game(self, id: i64, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Game {
        Game {
            id,
            igdb_id: self.igdb_id,
            slug: self.slug,
            name: self.name,
            summary: self.summary,
            description: self.description,
            release_date: self.release_date,
            cover_url: self.cover_url,
            screenshots: self.screenshots,
            genres: self.genres,
            platforms: self.platforms,
            developer: self.developer,
            publisher: self.publisher,
            total_rating: self.total_rating,
            aggregated_rating: self.aggregated_rating,
            rating_count: self.rating_count,
            category: self.category,
            parent_game: self.parent_game,
            franchise: self.franchise,
            collection: self.collection,
            alternative_names: self.alternative_names,
            similar_game_ids: self.similar_game_ids,
            dlc_ids: self.dlc_ids,
            expansion_ids: self.expansion_ids,
            user_rating_avg: None,
            user_rating_count: 0,
            created_at,
            updated_at,
            last_synced: self.last_synced,
            data_source: self.data_source,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Updates
// ─────────────────────────────────────────────────────────────────────────────

/// Named-field patch for an existing game row.
///
/// `None` means "leave unchanged"; there is no way to null a column through
/// a patch. Full replacement goes through `GameChange::Replace`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GamePatch {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub genres: Option<Vec<String>>,
    pub platforms: Option<Vec<String>>,
    pub release_date: Option<NaiveDate>,
    pub cover_url: Option<String>,
    pub screenshots: Option<Vec<String>>,
    pub total_rating: Option<f64>,
    pub aggregated_rating: Option<f64>,
    pub rating_count: Option<u32>,
    pub category: Option<CatalogCategory>,
    pub parent_game: Option<i64>,
    pub franchise: Option<String>,
    pub collection: Option<String>,
    pub alternative_names: Option<Vec<String>>,
    pub last_synced: Option<DateTime<Utc>>,
    pub data_source: Option<String>,
}

impl GamePatch {
    /// True when applying the patch would change no content column.
    ///
    /// Bookkeeping columns (`last_synced`, `data_source`) alone do not make
    /// a patch worth writing.
    pub const fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.description.is_none()
            && self.developer.is_none()
            && self.publisher.is_none()
            && self.genres.is_none()
            && self.platforms.is_none()
            && self.release_date.is_none()
            && self.cover_url.is_none()
            && self.screenshots.is_none()
            && self.total_rating.is_none()
            && self.aggregated_rating.is_none()
            && self.rating_count.is_none()
            && self.category.is_none()
            && self.parent_game.is_none()
            && self.franchise.is_none()
            && self.collection.is_none()
            && self.alternative_names.is_none()
    }

    /// Apply the patch to an in-memory game.
    pub fn apply_to(&self, game: &mut Game) {
        fn set<T: Clone>(slot: &mut T, value: Option<&T>) {
            if let Some(v) = value {
                slot.clone_from(v);
            }
        }
        fn set_opt<T: Clone>(slot: &mut Option<T>, value: Option<&T>) {
            if let Some(v) = value {
                *slot = Some(v.clone());
            }
        }

        set_opt(&mut game.summary, self.summary.as_ref());
        set_opt(&mut game.description, self.description.as_ref());
        set_opt(&mut game.developer, self.developer.as_ref());
        set_opt(&mut game.publisher, self.publisher.as_ref());
        set(&mut game.genres, self.genres.as_ref());
        set(&mut game.platforms, self.platforms.as_ref());
        set_opt(&mut game.release_date, self.release_date.as_ref());
        set_opt(&mut game.cover_url, self.cover_url.as_ref());
        set(&mut game.screenshots, self.screenshots.as_ref());
        set_opt(&mut game.total_rating, self.total_rating.as_ref());
        set_opt(&mut game.aggregated_rating, self.aggregated_rating.as_ref());
        set_opt(&mut game.rating_count, self.rating_count.as_ref());
        set_opt(&mut game.category, self.category.as_ref());
        set_opt(&mut game.parent_game, self.parent_game.as_ref());
        set_opt(&mut game.franchise, self.franchise.as_ref());
        set_opt(&mut game.collection, self.collection.as_ref());
        set(&mut game.alternative_names, self.alternative_names.as_ref());
        set_opt(&mut game.last_synced, self.last_synced.as_ref());
        set_opt(&mut game.data_source, self.data_source.as_ref());
    }
}

/// What to write to an existing row.
#[derive(Debug, Clone, PartialEq)]
pub enum GameChange {
    /// Fill the named fields only.
    Patch(GamePatch),
    /// Overwrite every catalog-derived column with the candidate's data.
    Replace(NewGame),
}

/// A change addressed to one existing row.
#[derive(Debug, Clone, PartialEq)]
pub struct GameUpdate {
    /// Internal id of the row being updated.
    pub id: i64,
    pub igdb_id: i64,
    pub change: GameChange,
}

impl GameChange {
    /// Apply the change to an in-memory game, keeping identity and user
    /// aggregates intact.
    pub fn apply_to(&self, game: &mut Game) {
        match self {
            Self::Patch(patch) => patch.apply_to(game),
            Self::Replace(new) => {
                let id = game.id;
                let slug = std::mem::take(&mut game.slug);
                let created_at = game.created_at;
                let updated_at = game.updated_at;
                let user_rating_avg = game.user_rating_avg;
                let user_rating_count = game.user_rating_count;
                *game = new.clone().into_game(id, created_at, updated_at);
                game.slug = slug;
                game.user_rating_avg = user_rating_avg;
                game.user_rating_count = user_rating_count;
            }
        }
    }
}
