//! Relevance scoring and result ordering.
//!
//! A score is a text-match base plus engagement bonuses. Scores are only
//! meaningful relative to one another for the same query.

use std::cmp::Ordering;

use crate::domain::{GameOrigin, SearchResult};

const EXACT_MATCH: f64 = 100.0;
const PREFIX_MATCH: f64 = 80.0;
const SUBSTRING_MATCH: f64 = 60.0;
const WORD_OVERLAP_WEIGHT: f64 = 40.0;

const TOTAL_RATING_CAP: f64 = 55.0;
const SECONDARY_RATING_CAP: f64 = 25.0;
const POPULARITY_CAP: f64 = 35.0;

/// Lowercase, trim, and collapse internal whitespace.
///
/// Control characters are dropped.
pub fn normalize_query(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Lowercase, strip punctuation, collapse whitespace.
///
/// Two names that normalize equally are treated as the same game.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() {
                Some(' ')
            } else {
                None
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Base score from how the name matches an already-normalized query.
pub fn text_score(name: &str, query: &str) -> f64 {
    let name = normalize_name(name);
    let query = normalize_name(query);
    if query.is_empty() {
        return 0.0;
    }

    if name == query {
        return EXACT_MATCH;
    }
    if name.starts_with(&query) {
        return PREFIX_MATCH;
    }
    if name.contains(&query) {
        return SUBSTRING_MATCH;
    }

    let name_words: Vec<&str> = name.split_whitespace().collect();
    let query_words: Vec<&str> = query.split_whitespace().collect();
    let found = query_words
        .iter()
        .filter(|q| {
            name_words
                .iter()
                .any(|w| w.contains(**q) || q.contains(*w))
        })
        .count();

    found as f64 / query_words.len() as f64 * WORD_OVERLAP_WEIGHT
}

/// Bonus from catalog ratings.
///
/// The total rating drives a piecewise curve that rewards the 70–90 band
/// most; without it, the critic rating gives a smaller convex bonus.
pub fn rating_bonus(total_rating: Option<f64>, secondary_rating: Option<f64>) -> f64 {
    if let Some(r) = total_rating.filter(|r| *r > 0.0) {
        let r = r.min(100.0);
        let bonus = if r <= 50.0 {
            0.2 * r
        } else if r <= 70.0 {
            10.0 + 0.5 * (r - 50.0)
        } else if r <= 90.0 {
            20.0 + 1.25 * (r - 70.0)
        } else {
            45.0 + (r - 90.0)
        };
        return bonus.min(TOTAL_RATING_CAP);
    }

    secondary_rating
        .filter(|r| *r > 0.0)
        .map_or(0.0, |r| {
            let fraction = r.min(100.0) / 100.0;
            (SECONDARY_RATING_CAP * fraction * fraction).min(SECONDARY_RATING_CAP)
        })
}

/// Bonus from how many ratings the catalog has collected.
pub fn popularity_bonus(rating_count: Option<u32>) -> f64 {
    let c = f64::from(rating_count.unwrap_or(0));
    let bonus = if c >= 1000.0 {
        30.0 + ((c - 1000.0) / 2000.0 * 5.0).min(5.0)
    } else if c >= 500.0 {
        22.0 + (c - 500.0) / 500.0 * 8.0
    } else if c >= 100.0 {
        12.0 + (c - 100.0) / 400.0 * 10.0
    } else if c >= 20.0 {
        5.0 + (c - 20.0) / 80.0 * 7.0
    } else {
        c / 20.0 * 5.0
    };
    bonus.min(POPULARITY_CAP)
}

/// Relevance of a result for a normalized query.
pub fn score(result: &SearchResult, query: &str) -> f64 {
    text_score(&result.name, query)
        + rating_bonus(result.total_rating, result.aggregated_rating)
        + popularity_bonus(result.rating_count)
}

/// Result ordering: relevance descending, local before remote, then name.
pub fn compare(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.relevance
        .total_cmp(&a.relevance)
        .then_with(|| origin_rank(a.origin).cmp(&origin_rank(b.origin)))
        .then_with(|| a.name.cmp(&b.name))
}

const fn origin_rank(origin: GameOrigin) -> u8 {
    match origin {
        GameOrigin::Local => 0,
        GameOrigin::Remote => 1,
    }
}

/// Score every result against `query`, then sort with [`compare`].
pub fn rank(results: &mut [SearchResult], query: &str) {
    for result in results.iter_mut() {
        result.relevance = score(result, query);
    }
    results.sort_by(compare);
}

/// Whether two results describe the same game: same external id or equal
/// normalized names.
pub fn is_same_game(a: &SearchResult, b: &SearchResult) -> bool {
    a.igdb_id == b.igdb_id || normalize_name(&a.name) == normalize_name(&b.name)
}
