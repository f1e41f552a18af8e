//! Catalog entry → local row conversion.

use chrono::{DateTime, NaiveDate, Utc};

use crate::config::SyncConfig;
use crate::domain::{CatalogEntry, NewGame};
use crate::ports::CoreError;

/// Image size used for stored covers.
const COVER_SIZE: &str = "t_1080p";
/// Image size used for stored screenshots.
const SCREENSHOT_SIZE: &str = "t_1080p";

/// Reject entries that cannot become a row.
///
/// An entry needs a positive id and a non-blank name no longer than
/// `max_name_len` characters.
pub fn validate(entry: &CatalogEntry, max_name_len: usize) -> Result<(), CoreError> {
    if entry.id <= 0 {
        return Err(CoreError::Validation(format!(
            "catalog entry has invalid id {}",
            entry.id
        )));
    }
    let name = entry.name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation(format!(
            "catalog entry {} has no name",
            entry.id
        )));
    }
    if name.chars().count() > max_name_len {
        return Err(CoreError::Validation(format!(
            "catalog entry {} name exceeds {max_name_len} characters",
            entry.id
        )));
    }
    Ok(())
}

/// Build the row for a validated entry.
pub fn to_new_game(entry: &CatalogEntry, config: &SyncConfig, now: DateTime<Utc>) -> NewGame {
    let name = entry.name.trim().to_string();
    let slug = entry
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(|| slugify(&name, entry.id), str::to_string);

    let mut game = NewGame::new(entry.id, slug, name);
    game.summary = non_blank(entry.summary.as_deref());
    game.description = non_blank(entry.storyline.as_deref());
    game.release_date = entry.first_release_date.and_then(epoch_to_date);
    game.cover_url = entry
        .cover_url
        .as_deref()
        .map(|url| normalize_image_url(url, COVER_SIZE));
    game.screenshots = entry
        .screenshot_urls
        .iter()
        .map(|url| normalize_image_url(url, SCREENSHOT_SIZE))
        .collect();
    game.genres = entry.genres.clone();
    game.platforms = entry.platforms.clone();
    game.developer = entry.developer().map(str::to_string);
    game.publisher = entry.publisher().map(str::to_string);
    game.total_rating = entry.total_rating;
    game.aggregated_rating = entry.aggregated_rating;
    game.rating_count = entry.rating_count;
    game.category = entry.category;
    game.parent_game = entry.parent_game;
    game.franchise = entry.franchise.clone();
    game.collection = entry.collection.clone();
    game.alternative_names = entry.alternative_names.clone();
    game.similar_game_ids = entry.similar_game_ids.clone();
    game.dlc_ids = entry.dlc_ids.clone();
    game.expansion_ids = entry.expansion_ids.clone();
    game.last_synced = Some(now);
    game.data_source = Some(config.data_source.clone());
    game
}

/// Epoch seconds to a calendar date (UTC).
pub fn epoch_to_date(seconds: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.date_naive())
}

/// Make a catalog image URL absolute and request the given size.
///
/// Catalog image URLs are protocol-relative and point at thumbnails:
/// `//images.igdb.com/igdb/image/upload/t_thumb/abc.jpg`.
pub fn normalize_image_url(url: &str, size: &str) -> String {
    let url = url.trim();
    let absolute = if url.starts_with("//") {
        format!("https:{url}")
    } else if url.starts_with("http://") {
        url.replacen("http://", "https://", 1)
    } else {
        url.to_string()
    };
    absolute.replacen("/t_thumb/", &format!("/{size}/"), 1)
}

/// URL-safe slug from a name. Falls back to `game-{id}` when nothing
/// alphanumeric is left.
pub fn slugify(name: &str, id: i64) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c != '\'' {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        format!("game-{id}")
    } else {
        slug
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
