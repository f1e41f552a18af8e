//! Search request and result types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::catalog::{CatalogCategory, CatalogEntry};
use super::game::Game;

/// Optional filters applied to a search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Every listed genre must be present on a result.
    pub genres: Vec<String>,
    /// Every listed platform must be present on a result.
    pub platforms: Vec<String>,
    /// Minimum catalog total rating (0–100).
    pub min_rating: Option<f64>,
    /// Release year.
    pub release_year: Option<i32>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genres.push(genre.into());
        self
    }

    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platforms.push(platform.into());
        self
    }

    #[must_use]
    pub const fn with_min_rating(mut self, rating: f64) -> Self {
        self.min_rating = Some(rating);
        self
    }

    #[must_use]
    pub const fn with_release_year(mut self, year: i32) -> Self {
        self.release_year = Some(year);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
            && self.platforms.is_empty()
            && self.min_rating.is_none()
            && self.release_year.is_none()
    }

    /// Apply the filters to fields already in search-result shape.
    ///
    /// Remote catalog searches are by name only, so their results are
    /// filtered in process.
    pub fn accepts(&self, result: &SearchResult) -> bool {
        self.accepts_fields(
            &result.genres,
            &result.platforms,
            result.total_rating,
            result.release_date,
        )
    }

    fn accepts_fields(
        &self,
        genres: &[String],
        platforms: &[String],
        total_rating: Option<f64>,
        release_date: Option<NaiveDate>,
    ) -> bool {
        let contains_all = |have: &[String], want: &[String]| {
            want.iter()
                .all(|w| have.iter().any(|h| h.eq_ignore_ascii_case(w)))
        };
        if !contains_all(genres, &self.genres) || !contains_all(platforms, &self.platforms) {
            return false;
        }

        if let Some(min) = self.min_rating {
            if total_rating.is_none_or(|r| r < min) {
                return false;
            }
        }

        if let Some(year) = self.release_year {
            use chrono::Datelike;
            if release_date.is_none_or(|d| d.year() != year) {
                return false;
            }
        }

        true
    }
}

/// Local store query built from a search request.
///
/// Passed to `GameRepository::search`. `text` is matched as a
/// case-insensitive substring of the name; list filters use containment.
#[derive(Debug, Clone, PartialEq)]
pub struct GameQuery {
    pub text: String,
    pub filters: SearchFilters,
    pub limit: usize,
}

impl GameQuery {
    pub fn new(text: impl Into<String>, filters: SearchFilters, limit: usize) -> Self {
        Self {
            text: text.into(),
            filters,
            limit,
        }
    }

    /// In-process evaluation of the query, for stores without a query engine.
    pub fn matches(&self, game: &Game) -> bool {
        let needle = self.text.to_lowercase();
        let name_match = needle.is_empty()
            || game.name.to_lowercase().contains(&needle)
            || game
                .alternative_names
                .iter()
                .any(|alt| alt.to_lowercase().contains(&needle));
        name_match
            && self.filters.accepts_fields(
                &game.genres,
                &game.platforms,
                game.total_rating,
                game.release_date,
            )
    }
}

/// Where a search result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOrigin {
    /// Row already present in the local store.
    Local,
    /// Only known to the remote catalog (not yet persisted).
    Remote,
}

/// A search hit in the shape shared by local and remote-only games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub origin: GameOrigin,
    /// Local id; `None` for remote-only results.
    pub id: Option<i64>,
    pub igdb_id: i64,
    pub slug: Option<String>,
    pub name: String,
    pub summary: Option<String>,
    pub cover_url: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub genres: Vec<String>,
    pub platforms: Vec<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub total_rating: Option<f64>,
    pub aggregated_rating: Option<f64>,
    pub rating_count: Option<u32>,
    pub category: Option<CatalogCategory>,
    /// Relevance score for the query that produced this result. Only used
    /// for ordering.
    pub relevance: f64,
}

impl From<&Game> for SearchResult {
    fn from(game: &Game) -> Self {
        Self {
            origin: GameOrigin::Local,
            id: Some(game.id),
            igdb_id: game.igdb_id,
            slug: Some(game.slug.clone()),
            name: game.name.clone(),
            summary: game.summary.clone(),
            cover_url: game.cover_url.clone(),
            release_date: game.release_date,
            genres: game.genres.clone(),
            platforms: game.platforms.clone(),
            developer: game.developer.clone(),
            publisher: game.publisher.clone(),
            total_rating: game.total_rating,
            aggregated_rating: game.aggregated_rating,
            rating_count: game.rating_count,
            category: game.category,
            relevance: 0.0,
        }
    }
}

impl From<&CatalogEntry> for SearchResult {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            origin: GameOrigin::Remote,
            id: None,
            igdb_id: entry.id,
            slug: entry.slug.clone(),
            name: entry.name.clone(),
            summary: entry.summary.clone(),
            cover_url: entry.cover_url.clone(),
            release_date: entry
                .first_release_date
                .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
                .map(|dt| dt.date_naive()),
            genres: entry.genres.clone(),
            platforms: entry.platforms.clone(),
            developer: entry.developer().map(str::to_string),
            publisher: entry.publisher().map(str::to_string),
            total_rating: entry.total_rating,
            aggregated_rating: entry.aggregated_rating,
            rating_count: entry.rating_count,
            category: entry.category,
            relevance: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewGame;
    use chrono::Utc;

    fn game(name: &str, genres: &[&str], rating: Option<f64>, year: Option<i32>) -> Game {
        let mut new = NewGame::new(1, "slug", name);
        new.genres = genres.iter().map(|g| (*g).to_string()).collect();
        new.total_rating = rating;
        new.release_date = year.and_then(|y| NaiveDate::from_ymd_opt(y, 6, 1));
        let now = Utc::now();
        new.into_game(1, now, now)
    }

    #[test]
    fn test_query_matches_substring_case_insensitive() {
        let q = GameQuery::new("zelda", SearchFilters::new(), 10);
        assert!(q.matches(&game("The Legend of Zelda", &[], None, None)));
        assert!(!q.matches(&game("Metroid", &[], None, None)));
    }

    #[test]
    fn test_query_genre_containment_requires_all() {
        let filters = SearchFilters::new()
            .with_genre("Adventure")
            .with_genre("RPG");
        let q = GameQuery::new("", filters, 10);
        assert!(q.matches(&game("A", &["Adventure", "RPG", "Puzzle"], None, None)));
        assert!(!q.matches(&game("B", &["Adventure"], None, None)));
    }

    #[test]
    fn test_query_rating_and_year() {
        let filters = SearchFilters::new()
            .with_min_rating(80.0)
            .with_release_year(2017);
        let q = GameQuery::new("", filters, 10);
        assert!(q.matches(&game("A", &[], Some(92.0), Some(2017))));
        assert!(!q.matches(&game("B", &[], Some(70.0), Some(2017))));
        assert!(!q.matches(&game("C", &[], Some(92.0), Some(2018))));
        assert!(!q.matches(&game("D", &[], None, Some(2017))));
    }

    #[test]
    fn test_result_serializes_origin_tag() {
        let result = SearchResult::from(&CatalogEntry::new(3, "Hades"));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["origin"], "remote");
        assert_eq!(json["igdb_id"], 3);
    }

    #[test]
    fn test_filters_accept_remote_results() {
        let entry = CatalogEntry::new(3, "Hades")
            .with_genres(["Roguelike", "Action"])
            .with_total_rating(93.0, 1200);
        let result = SearchResult::from(&entry);
        assert!(SearchFilters::new().with_genre("action").accepts(&result));
        assert!(!SearchFilters::new().with_platform("PC").accepts(&result));
        assert!(!SearchFilters::new().with_min_rating(95.0).accepts(&result));
    }

    #[test]
    fn test_remote_result_converts_release_timestamp() {
        let mut entry = CatalogEntry::new(9, "Celeste");
        entry.first_release_date = Some(1_516_838_400); // 2018-01-25
        let result = SearchResult::from(&entry);
        assert_eq!(result.origin, GameOrigin::Remote);
        assert_eq!(result.release_date, NaiveDate::from_ymd_opt(2018, 1, 25));
        assert!(result.id.is_none());
    }
}
