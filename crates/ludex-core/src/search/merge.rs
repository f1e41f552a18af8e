//! Dual-source merge.

use crate::domain::{CatalogEntry, SearchResult};

use super::scoring::{is_same_game, rank};

/// Outcome of merging remote entries into local results.
#[derive(Debug, Clone, Default)]
pub struct Merged {
    /// Local results plus unique remote ones, ranked for the query.
    pub results: Vec<SearchResult>,
    /// Remote entries that had no local counterpart, in catalog order.
    pub new_entries: Vec<CatalogEntry>,
}

/// Merge remote entries into local results and rank the union.
///
/// A remote entry is dropped when it is the same game as a local result or
/// as an earlier remote entry.
pub fn merge(local: Vec<SearchResult>, remote: &[CatalogEntry], query: &str) -> Merged {
    let mut results = local;
    let local_len = results.len();
    let mut new_entries = Vec::new();

    for entry in remote {
        let candidate = SearchResult::from(entry);
        if results.iter().any(|existing| is_same_game(existing, &candidate)) {
            continue;
        }
        results.push(candidate);
        new_entries.push(entry.clone());
    }

    tracing::debug!(
        local = local_len,
        remote = remote.len(),
        unique_remote = new_entries.len(),
        "Merged search results"
    );

    rank(&mut results, query);
    Merged {
        results,
        new_entries,
    }
}
