//! Deciding what to write to an existing row.

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::{Game, GameChange, GamePatch, NewGame, is_blank};

fn fill_text(existing: Option<&str>, candidate: Option<&String>) -> Option<String> {
    if is_blank(existing) {
        candidate.filter(|c| !c.trim().is_empty()).cloned()
    } else {
        None
    }
}

fn fill_list<T: Clone>(existing: &[T], candidate: &[T]) -> Option<Vec<T>> {
    (existing.is_empty() && !candidate.is_empty()).then(|| candidate.to_vec())
}

fn fill<T: Clone>(existing: Option<&T>, candidate: Option<&T>) -> Option<T> {
    if existing.is_none() {
        candidate.cloned()
    } else {
        None
    }
}

/// Change for a search-time sync.
///
/// Rows last updated more than `full_refresh_after` ago are replaced
/// wholesale. Otherwise only empty text fields (summary, description,
/// developer, publisher) and empty genre/platform lists are filled; an
/// existing value always wins. `None` when there is nothing to write.
pub fn plan_change(
    existing: &Game,
    candidate: &NewGame,
    now: DateTime<Utc>,
    full_refresh_after: TimeDelta,
) -> Option<GameChange> {
    if existing.is_stale(now, full_refresh_after) {
        return Some(GameChange::Replace(candidate.clone()));
    }

    let patch = GamePatch {
        summary: fill_text(existing.summary.as_deref(), candidate.summary.as_ref()),
        description: fill_text(existing.description.as_deref(), candidate.description.as_ref()),
        developer: fill_text(existing.developer.as_deref(), candidate.developer.as_ref()),
        publisher: fill_text(existing.publisher.as_deref(), candidate.publisher.as_ref()),
        genres: fill_list(&existing.genres, &candidate.genres),
        platforms: fill_list(&existing.platforms, &candidate.platforms),
        last_synced: candidate.last_synced,
        data_source: candidate.data_source.clone(),
        ..GamePatch::default()
    };

    (!patch.is_empty()).then_some(GameChange::Patch(patch))
}

/// Change for the bulk backfill.
///
/// Fills every missing scalar and empty list, keeps the larger rating
/// count and always takes the catalog's critic rating and alternative
/// names. Bookkeeping fields
/// are always stamped, so the result is written even when no content
/// column changes.
pub fn backfill_patch(existing: &Game, candidate: &NewGame) -> GamePatch {
    let rating_count = match (existing.rating_count, candidate.rating_count) {
        (Some(have), Some(got)) if got > have => Some(got),
        (None, got) => got,
        _ => None,
    };

    GamePatch {
        summary: fill_text(existing.summary.as_deref(), candidate.summary.as_ref()),
        description: fill_text(existing.description.as_deref(), candidate.description.as_ref()),
        developer: fill_text(existing.developer.as_deref(), candidate.developer.as_ref()),
        publisher: fill_text(existing.publisher.as_deref(), candidate.publisher.as_ref()),
        genres: fill_list(&existing.genres, &candidate.genres),
        platforms: fill_list(&existing.platforms, &candidate.platforms),
        release_date: fill(existing.release_date.as_ref(), candidate.release_date.as_ref()),
        cover_url: fill_text(existing.cover_url.as_deref(), candidate.cover_url.as_ref()),
        screenshots: fill_list(&existing.screenshots, &candidate.screenshots),
        total_rating: fill(existing.total_rating.as_ref(), candidate.total_rating.as_ref()),
        aggregated_rating: candidate.aggregated_rating,
        rating_count,
        category: fill(existing.category.as_ref(), candidate.category.as_ref()),
        parent_game: fill(existing.parent_game.as_ref(), candidate.parent_game.as_ref()),
        franchise: fill_text(existing.franchise.as_deref(), candidate.franchise.as_ref()),
        collection: fill_text(existing.collection.as_deref(), candidate.collection.as_ref()),
        alternative_names: (!candidate.alternative_names.is_empty())
            .then(|| candidate.alternative_names.clone()),
        last_synced: candidate.last_synced,
        data_source: candidate.data_source.clone(),
    }
}
