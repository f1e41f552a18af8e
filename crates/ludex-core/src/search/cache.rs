//! Bounded search result cache.
//!
//! Entries expire after a fixed TTL (checked on read). When full, the entry
//! with the fewest hits is evicted; ties go to the oldest insertion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::domain::SearchFilters;

/// Deterministic signature of a search.
///
/// Lowercased query, sorted genre and platform filters, minimum rating and
/// release year, joined with `|`.
pub fn cache_key(query: &str, filters: &SearchFilters) -> String {
    let mut genres: Vec<String> = filters.genres.iter().map(|g| g.to_lowercase()).collect();
    genres.sort();
    let mut platforms: Vec<String> = filters.platforms.iter().map(|p| p.to_lowercase()).collect();
    platforms.sort();

    format!(
        "{}|{}|{}|{}|{}",
        query.trim().to_lowercase(),
        genres.join(","),
        platforms.join(","),
        filters.min_rating.map(|r| r.to_string()).unwrap_or_default(),
        filters.release_year.map(|y| y.to_string()).unwrap_or_default(),
    )
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    hits: u64,
    seq: u64,
}

#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    next_seq: u64,
}

/// Capacity-bounded, TTL-expiring cache keyed by search signature.
pub struct ResultCache<V> {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState<V>>,
}

impl<V: Clone> ResultCache<V> {
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                next_seq: 0,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a key. Expired entries are removed and count as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut state = self.lock();

        let expired = match state.entries.get_mut(key) {
            None => return None,
            Some(entry) if now.duration_since(entry.inserted_at) >= self.config.ttl => true,
            Some(entry) => {
                entry.hits += 1;
                return Some(entry.value.clone());
            }
        };

        if expired {
            state.entries.remove(key);
            tracing::debug!(key, "Search cache entry expired");
        }
        None
    }

    /// Store a value, evicting the least-hit entry when at capacity.
    pub fn set(&self, key: impl Into<String>, value: V) {
        if self.config.capacity == 0 {
            return;
        }
        let key = key.into();
        let now = self.clock.now();
        let mut state = self.lock();

        if !state.entries.contains_key(&key) && state.entries.len() >= self.config.capacity {
            let victim = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| (entry.hits, entry.seq))
                .map(|(k, _)| k.clone());
            if let Some(victim) = victim {
                state.entries.remove(&victim);
                tracing::debug!(key = %victim, "Evicted search cache entry");
            }
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
                hits: 0,
                seq,
            },
        );
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a key is present, without counting a hit or checking expiry.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().entries.contains_key(key)
    }
}

impl<V> std::fmt::Debug for ResultCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::time::Duration;

    fn cache(capacity: usize) -> (Arc<ManualClock>, ResultCache<u32>) {
        let clock = Arc::new(ManualClock::new());
        let config = CacheConfig::new()
            .with_capacity(capacity)
            .with_ttl(Duration::from_secs(300));
        (clock.clone(), ResultCache::new(config, clock))
    }

    #[test]
    fn test_key_is_order_insensitive() {
        let a = SearchFilters::new().with_genre("RPG").with_genre("Adventure");
        let b = SearchFilters::new().with_genre("adventure").with_genre("rpg");
        assert_eq!(cache_key("Zelda ", &a), cache_key("zelda", &b));
        assert_ne!(
            cache_key("zelda", &a),
            cache_key("zelda", &a.clone().with_release_year(2017))
        );
    }

    #[test]
    fn test_hit_within_ttl_miss_after() {
        let (clock, cache) = cache(10);
        cache.set("k", 7);

        clock.advance(Duration::from_secs(299));
        assert_eq!(cache.get("k"), Some(7));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_eviction_removes_lowest_hit_count() {
        let (_clock, cache) = cache(3);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("c", 3);
        cache.get("a");
        cache.get("a");
        cache.get("c");

        cache.set("d", 4);

        assert_eq!(cache.len(), 3);
        assert!(!cache.contains("b"));
        assert!(cache.contains("a"));
        assert!(cache.contains("c"));
        assert!(cache.contains("d"));
    }

    #[test]
    fn test_eviction_tie_goes_to_oldest() {
        let (_clock, cache) = cache(2);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("c", 3);
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let (_clock, cache) = cache(2);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("a", 10);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(10));
    }

    #[test]
    fn test_clear() {
        let (_clock, cache) = cache(2);
        cache.set("a", 1);
        cache.clear();
        assert_eq!(cache.get("a"), None);
    }
}
