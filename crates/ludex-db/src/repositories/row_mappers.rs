//! Row mapping helpers for `SQLite` queries.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use ludex_core::{CatalogCategory, Game, NewGame, Review, Reviewer, RepositoryError};
use serde::de::DeserializeOwned;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// Shared SELECT column list for game queries.
pub const GAME_SELECT_COLUMNS: &str = "id, igdb_id, slug, name, summary, description, release_date, cover_url, screenshots, genres, platforms, developer, publisher, total_rating, aggregated_rating, rating_count, category, parent_game, franchise, collection, alternative_names, similar_game_ids, dlc_ids, expansion_ids, user_rating_avg, user_rating_count, created_at, updated_at, last_synced, data_source";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Map a driver error onto the storage-agnostic repository error.
pub fn storage_error(e: sqlx::Error) -> RepositoryError {
    match &e {
        // A slug clash is not the same game arriving twice.
        sqlx::Error::Database(db) if db.is_unique_violation() && db.message().contains(".slug") => {
            RepositoryError::Constraint(db.message().to_string())
        }
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::AlreadyExists(db.message().to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            RepositoryError::Constraint(db.message().to_string())
        }
        _ => RepositoryError::Storage(e.to_string()),
    }
}

fn get<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| RepositoryError::Storage(e.to_string()))
}

fn json_list<T: DeserializeOwned>(row: &SqliteRow, column: &str) -> Result<Vec<T>, RepositoryError> {
    let raw: Option<String> = get(row, column)?;
    Ok(raw
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default())
}

/// Serialize a list column.
pub fn to_json<T: serde::Serialize>(values: &[T]) -> Result<String, RepositoryError> {
    serde_json::to_string(values).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

/// Fixed-width RFC 3339 so stored timestamps sort as text.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

fn parse_date(raw: Option<String>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok())
}

fn to_u32(value: Option<i64>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok())
}

/// Parse a database row into a Game.
pub fn row_to_game(row: &SqliteRow) -> Result<Game, RepositoryError> {
    let created_at = parse_timestamp(get(row, "created_at")?).unwrap_or_else(Utc::now);
    Ok(Game {
        id: get(row, "id")?,
        igdb_id: get(row, "igdb_id")?,
        slug: get(row, "slug")?,
        name: get(row, "name")?,
        summary: get(row, "summary")?,
        description: get(row, "description")?,
        release_date: parse_date(get(row, "release_date")?),
        cover_url: get(row, "cover_url")?,
        screenshots: json_list(row, "screenshots")?,
        genres: json_list(row, "genres")?,
        platforms: json_list(row, "platforms")?,
        developer: get(row, "developer")?,
        publisher: get(row, "publisher")?,
        total_rating: get(row, "total_rating")?,
        aggregated_rating: get(row, "aggregated_rating")?,
        rating_count: to_u32(get(row, "rating_count")?),
        category: get::<Option<i32>>(row, "category")?.map(CatalogCategory::from_code),
        parent_game: get(row, "parent_game")?,
        franchise: get(row, "franchise")?,
        collection: get(row, "collection")?,
        alternative_names: json_list(row, "alternative_names")?,
        similar_game_ids: json_list(row, "similar_game_ids")?,
        dlc_ids: json_list(row, "dlc_ids")?,
        expansion_ids: json_list(row, "expansion_ids")?,
        user_rating_avg: get(row, "user_rating_avg")?,
        user_rating_count: to_u32(get(row, "user_rating_count")?).unwrap_or(0),
        created_at,
        updated_at: parse_timestamp(get(row, "updated_at")?).unwrap_or(created_at),
        last_synced: parse_timestamp(get(row, "last_synced")?),
        data_source: get(row, "data_source")?,
    })
}

/// Encoded column values of a game row, ready to bind.
///
/// Shared by INSERT and the full-row UPDATE so both write identical shapes.
pub struct GameColumns {
    pub release_date: Option<String>,
    pub screenshots: String,
    pub genres: String,
    pub platforms: String,
    pub category: Option<i32>,
    pub alternative_names: String,
    pub similar_game_ids: String,
    pub dlc_ids: String,
    pub expansion_ids: String,
    pub last_synced: Option<String>,
}

impl GameColumns {
    pub fn from_new(game: &NewGame) -> Result<Self, RepositoryError> {
        Ok(Self {
            release_date: format_date(game.release_date),
            screenshots: to_json(&game.screenshots)?,
            genres: to_json(&game.genres)?,
            platforms: to_json(&game.platforms)?,
            category: game.category.map(CatalogCategory::code),
            alternative_names: to_json(&game.alternative_names)?,
            similar_game_ids: to_json(&game.similar_game_ids)?,
            dlc_ids: to_json(&game.dlc_ids)?,
            expansion_ids: to_json(&game.expansion_ids)?,
            last_synced: game.last_synced.map(format_timestamp),
        })
    }

    pub fn from_game(game: &Game) -> Result<Self, RepositoryError> {
        Ok(Self {
            release_date: format_date(game.release_date),
            screenshots: to_json(&game.screenshots)?,
            genres: to_json(&game.genres)?,
            platforms: to_json(&game.platforms)?,
            category: game.category.map(CatalogCategory::code),
            alternative_names: to_json(&game.alternative_names)?,
            similar_game_ids: to_json(&game.similar_game_ids)?,
            dlc_ids: to_json(&game.dlc_ids)?,
            expansion_ids: to_json(&game.expansion_ids)?,
            last_synced: game.last_synced.map(format_timestamp),
        })
    }
}

/// Parse a joined ratings/users row into a Review.
pub fn row_to_review(row: &SqliteRow) -> Result<Review, RepositoryError> {
    Ok(Review {
        id: get(row, "id")?,
        game_id: get(row, "game_id")?,
        rating: get(row, "rating")?,
        review: get(row, "review")?,
        created_at: parse_timestamp(get(row, "created_at")?).unwrap_or_else(Utc::now),
        author: Reviewer {
            id: get(row, "user_id")?,
            username: get(row, "username")?,
            display_name: get(row, "display_name")?,
            avatar_url: get(row, "avatar_url")?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_round_trip_keeps_micros() {
        use chrono::SubsecRound;
        let now = Utc::now().trunc_subsecs(6);
        assert!(format_timestamp(now).ends_with('Z'));
        assert_eq!(parse_timestamp(Some(format_timestamp(now))), Some(now));
        assert_eq!(parse_timestamp(Some("not a date".to_string())), None);
    }

    #[test]
    fn test_date_format() {
        let date = NaiveDate::from_ymd_opt(2017, 3, 3);
        assert_eq!(format_date(date).as_deref(), Some("2017-03-03"));
        assert_eq!(parse_date(format_date(date)), date);
    }
}
