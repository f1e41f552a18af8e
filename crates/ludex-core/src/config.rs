//! Tunables for the search and sync pipeline.
//!
//! Every config type has a `Default` matching production behavior and
//! builder-style `with_*` setters.
//!
//! ```
//! use ludex_core::config::{CacheConfig, CoreConfig};
//! use std::time::Duration;
//!
//! let config = CoreConfig::default()
//!     .with_cache(CacheConfig::new().with_ttl(Duration::from_secs(60)));
//! assert_eq!(config.cache.capacity, 50);
//! ```

use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Search
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for `GameService::search_games` and external-id lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Deadline for the remote branch of a search.
    pub remote_timeout: Duration,
    /// Deadline for a single remote point lookup.
    pub lookup_timeout: Duration,
    /// How many rows to read from the local store per search.
    pub local_limit: usize,
    /// How many entries to ask the remote catalog for.
    pub remote_limit: usize,
    /// Result count used when the caller passes zero.
    pub default_max_results: usize,
    /// Below this many local hits, remote results are always merged.
    pub min_local_results: usize,
    /// Franchise queries merge remote results below this many local hits.
    pub franchise_min_local_results: usize,
    /// Other queries merge remote results below this many local hits.
    pub fallback_min_local_results: usize,
    /// Local rows older than this make a franchise query merge remote results.
    pub stale_after: Duration,
    /// Probability of merging remote results for an otherwise well-covered
    /// franchise query.
    pub freshness_probability: f64,
    /// Seed for the freshness sampler; `None` seeds from entropy.
    pub freshness_seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            remote_timeout: Duration::from_secs(1),
            lookup_timeout: Duration::from_secs(5),
            local_limit: 50,
            remote_limit: 20,
            default_max_results: 20,
            min_local_results: 3,
            franchise_min_local_results: 10,
            fallback_min_local_results: 5,
            stale_after: Duration::from_secs(7 * 24 * 60 * 60),
            freshness_probability: 0.1,
            freshness_seed: None,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_local_limit(mut self, limit: usize) -> Self {
        self.local_limit = limit;
        self
    }

    #[must_use]
    pub const fn with_remote_limit(mut self, limit: usize) -> Self {
        self.remote_limit = limit;
        self
    }

    #[must_use]
    pub const fn with_default_max_results(mut self, max: usize) -> Self {
        self.default_max_results = max;
        self
    }

    /// Set the probability (clamped to `0.0..=1.0`) of a freshness merge.
    #[must_use]
    pub fn with_freshness_probability(mut self, probability: f64) -> Self {
        self.freshness_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Make the freshness sampler deterministic.
    #[must_use]
    pub const fn with_freshness_seed(mut self, seed: u64) -> Self {
        self.freshness_seed = Some(seed);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cache
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the search result cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of cached searches.
    pub capacity: usize,
    /// How long an entry stays valid.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 50,
            ttl: Duration::from_secs(5 * 60),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Circuit breaker
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the remote catalog circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit.
    pub failure_threshold: u32,
    /// How long the circuit stays open before probing.
    pub open_timeout: Duration,
    /// Probe calls allowed (and successes required) while half-open.
    pub half_open_probes: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            open_timeout: Duration::from_secs(60),
            half_open_probes: 2,
        }
    }
}

impl CircuitBreakerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_open_timeout(mut self, timeout: Duration) -> Self {
        self.open_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_half_open_probes(mut self, probes: u32) -> Self {
        self.half_open_probes = probes;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sync queue
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the background sync queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncQueueConfig {
    /// Pause between two persisted batches.
    pub batch_delay: Duration,
    /// Period of the background tick that restarts processing.
    pub tick_interval: Duration,
    /// Failures after which an item is parked in the failed list.
    pub max_retries: u32,
    /// Backoff unit; the n-th retry waits `backoff_base * 2^n`.
    pub backoff_base: Duration,
}

impl Default for SyncQueueConfig {
    fn default() -> Self {
        Self {
            batch_delay: Duration::from_secs(1),
            tick_interval: Duration::from_secs(5),
            max_retries: 3,
            backoff_base: Duration::from_secs(60),
        }
    }
}

impl SyncQueueConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    #[must_use]
    pub const fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    #[must_use]
    pub const fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Delay before the retry that follows `retry_count` failures.
    pub fn backoff_for(&self, retry_count: u32) -> Duration {
        self.backoff_base
            .saturating_mul(2_u32.saturating_pow(retry_count))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sync service
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for `GameSyncService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Rows per batch write.
    pub chunk_size: usize,
    /// Longest accepted game name, in characters.
    pub max_name_len: usize,
    /// Rows last updated longer ago than this are fully replaced.
    pub full_refresh_after: Duration,
    /// Value stamped into `data_source` on written rows.
    pub data_source: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            chunk_size: 50,
            max_name_len: 255,
            full_refresh_after: Duration::from_secs(30 * 24 * 60 * 60),
            data_source: "search_sync".to_string(),
        }
    }
}

impl SyncConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the batch size (at least 1).
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    #[must_use]
    pub const fn with_full_refresh_after(mut self, age: Duration) -> Self {
        self.full_refresh_after = age;
        self
    }

    #[must_use]
    pub fn with_data_source(mut self, source: impl Into<String>) -> Self {
        self.data_source = source.into();
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backfill
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the bulk backfill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillConfig {
    /// Ids per catalog request. The catalog rejects more than 500.
    pub batch_size: usize,
    /// Catalog requests in flight at once.
    pub parallelism: usize,
    /// Upper bound on rows considered; `None` means all.
    pub limit: Option<usize>,
}

/// Hard ceiling on ids per catalog lookup.
pub const MAX_CATALOG_BATCH: usize = 500;

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            batch_size: MAX_CATALOG_BATCH,
            parallelism: 20,
            limit: None,
        }
    }
}

impl BackfillConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set ids per request, clamped to `1..=500`.
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.clamp(1, MAX_CATALOG_BATCH);
        self
    }

    #[must_use]
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate
// ─────────────────────────────────────────────────────────────────────────────

/// All core tunables in one place, handed to the composition root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreConfig {
    pub search: SearchConfig,
    pub cache: CacheConfig,
    pub breaker: CircuitBreakerConfig,
    pub queue: SyncQueueConfig,
    pub sync: SyncConfig,
    pub backfill: BackfillConfig,
}

impl CoreConfig {
    #[must_use]
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    #[must_use]
    pub const fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub const fn with_breaker(mut self, breaker: CircuitBreakerConfig) -> Self {
        self.breaker = breaker;
        self
    }

    #[must_use]
    pub const fn with_queue(mut self, queue: SyncQueueConfig) -> Self {
        self.queue = queue;
        self
    }

    #[must_use]
    pub fn with_sync(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    #[must_use]
    pub const fn with_backfill(mut self, backfill: BackfillConfig) -> Self {
        self.backfill = backfill;
        self
    }
}
