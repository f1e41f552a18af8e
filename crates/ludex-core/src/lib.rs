//! Core of ludex: a game catalog that searches a local store and a remote
//! catalog together and keeps the local store filled in the background.
//!
//! # Structure
//!
//! - [`domain`] - games, catalog entries, search and review types
//! - [`ports`] - repository and catalog traits plus their errors
//! - [`search`] - relevance scoring, merge heuristics, result cache
//! - [`resilience`] - circuit breaker and in-flight deduplication
//! - [`sync`] - catalog → local persistence, background queue, backfill
//! - [`services`] - `GameService` and the `LudexCore` facade
//! - [`memory`] - in-memory repositories for tests and tooling
//!
//! Adapters live in sibling crates: `ludex-db` (SQLite) and `ludex-igdb`
//! (IGDB HTTP API).

pub mod clock;
pub mod config;
pub mod domain;
pub mod memory;
pub mod ports;
pub mod resilience;
pub mod search;
pub mod services;
pub mod sync;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    BackfillConfig, CacheConfig, CircuitBreakerConfig, CoreConfig, SearchConfig, SyncConfig,
    SyncQueueConfig,
};
pub use domain::{
    CatalogCategory, CatalogEntry, Game, GameChange, GameOrigin, GamePatch, GameQuery, GameRef,
    GameUpdate, GameWithReviews, InvolvedCompany, NewGame, NewRating, Review, Reviewer,
    SearchFilters, SearchResult,
};
pub use ports::{
    CatalogError, CatalogPort, CatalogResult, CoreError, GameRepository, RatingRepository, Repos,
    RepositoryError,
};
pub use resilience::{BreakerSnapshot, CircuitBreaker, CircuitState, InFlight};
pub use services::{GameService, GameServiceDeps, LudexCore};
pub use sync::{
    BackfillReport, BackfillService, CatalogSink, GameSyncService, ImmediateOutcome,
    QueueStatistics, SyncMetrics, SyncQueue, SyncReport,
};
