//! Game lookup and search orchestration.
//!
//! Reads go to the local store first. The remote catalog fills gaps:
//! incomplete rows are refreshed on external-id reads, and searches merge
//! remote hits when local coverage is thin. Newly discovered games are
//! persisted in the background through the [`SyncQueue`].

use std::sync::Arc;

use chrono::TimeDelta;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::SearchConfig;
use crate::domain::{
    CatalogEntry, Game, GameQuery, GameRef, GameWithReviews, SearchFilters, SearchResult,
};
use crate::ports::{CatalogPort, CoreError, GameRepository, RatingRepository};
use crate::resilience::{BreakerSnapshot, CircuitBreaker, InFlight};
use crate::search::{
    LocalCoverage, MergePolicy, ResultCache, cache_key, is_common_query, merge, normalize_query,
    rank,
};
use crate::sync::{GameSyncService, SyncQueue};

type Lookup = Result<Option<Game>, CoreError>;

/// Collaborators of [`GameService`].
#[derive(Clone)]
pub struct GameServiceDeps {
    pub games: Arc<dyn GameRepository>,
    pub ratings: Arc<dyn RatingRepository>,
    pub catalog: Arc<dyn CatalogPort>,
    pub sync: Arc<GameSyncService>,
    pub queue: Arc<SyncQueue>,
    pub breaker: Arc<CircuitBreaker>,
    pub clock: Arc<dyn Clock>,
}

/// Top-level search and lookup API.
pub struct GameService {
    games: Arc<dyn GameRepository>,
    ratings: Arc<dyn RatingRepository>,
    catalog: Arc<dyn CatalogPort>,
    sync: Arc<GameSyncService>,
    queue: Arc<SyncQueue>,
    breaker: Arc<CircuitBreaker>,
    clock: Arc<dyn Clock>,
    cache: ResultCache<Vec<SearchResult>>,
    policy: MergePolicy,
    config: SearchConfig,
    searches: InFlight<Vec<SearchResult>>,
    lookups: InFlight<Lookup>,
    reviews: InFlight<Result<Option<GameWithReviews>, CoreError>>,
    lists: InFlight<Result<Vec<Game>, CoreError>>,
}

impl GameService {
    pub fn new(
        deps: GameServiceDeps,
        config: SearchConfig,
        cache: ResultCache<Vec<SearchResult>>,
    ) -> Self {
        let policy = MergePolicy::from_config(&config);
        Self::with_policy(deps, config, cache, policy)
    }

    /// Construct with an explicit merge policy (e.g. a fixed sampler).
    pub fn with_policy(
        deps: GameServiceDeps,
        config: SearchConfig,
        cache: ResultCache<Vec<SearchResult>>,
        policy: MergePolicy,
    ) -> Self {
        Self {
            games: deps.games,
            ratings: deps.ratings,
            catalog: deps.catalog,
            sync: deps.sync,
            queue: deps.queue,
            breaker: deps.breaker,
            clock: deps.clock,
            cache,
            policy,
            config,
            searches: InFlight::new(),
            lookups: InFlight::new(),
            reviews: InFlight::new(),
            lists: InFlight::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Point lookups
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn get_game_by_id(&self, id: i64) -> Lookup {
        self.lookups
            .run(&format!("game:id:{id}"), || async move {
                self.games.get_by_id(id).await.map_err(CoreError::from)
            })
            .await
    }

    pub async fn get_game_by_slug(&self, slug: &str) -> Lookup {
        self.lookups
            .run(&format!("game:slug:{slug}"), || async move {
                self.games.get_by_slug(slug).await.map_err(CoreError::from)
            })
            .await
    }

    /// Look up by external id, refreshing from the catalog when the row is
    /// missing or incomplete.
    ///
    /// A failed refresh falls back to whatever the local store has.
    pub async fn get_game_by_igdb_id(&self, igdb_id: i64) -> Lookup {
        self.lookups
            .run(&format!("game:igdb:{igdb_id}"), || {
                self.load_by_igdb_id(igdb_id)
            })
            .await
    }

    async fn load_by_igdb_id(&self, igdb_id: i64) -> Lookup {
        match self.games.get_by_igdb_id(igdb_id).await? {
            Some(game) if !game.is_incomplete() => Ok(Some(game)),
            local => self.refresh(igdb_id, local).await,
        }
    }

    /// A game and all its reviews, newest first.
    pub async fn get_game_with_full_reviews(
        &self,
        game: &GameRef,
    ) -> Result<Option<GameWithReviews>, CoreError> {
        self.reviews
            .run(&format!("reviews:{game}"), || self.load_with_reviews(game))
            .await
    }

    async fn load_with_reviews(
        &self,
        game: &GameRef,
    ) -> Result<Option<GameWithReviews>, CoreError> {
        let local = match game {
            GameRef::Id(id) => self.games.get_by_id(*id).await?,
            GameRef::Slug(slug) => self.games.get_by_slug(slug).await?,
        };
        let Some(local) = local else {
            return Ok(None);
        };

        let game = if local.is_incomplete() {
            self.refresh(local.igdb_id, Some(local.clone()))
                .await?
                .unwrap_or(local)
        } else {
            local
        };

        let reviews = self.ratings.reviews_for_game(game.id).await?;
        Ok(Some(GameWithReviews { game, reviews }))
    }

    /// Fetch one entry from the catalog, persist it and reread the row.
    async fn refresh(&self, igdb_id: i64, local: Option<Game>) -> Lookup {
        let fetched = self
            .breaker
            .call(self.config.lookup_timeout, self.catalog.get_by_id(igdb_id))
            .await;

        let entry = match fetched {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!(igdb_id, "Catalog has no entry");
                return Ok(local);
            }
            Err(e) => {
                warn!(igdb_id, error = %e, "Catalog refresh failed, using local data");
                return Ok(local);
            }
        };

        if let Err(e) = self.sync.save_games_from_catalog(&[entry]).await {
            warn!(igdb_id, error = %e, "Persisting refreshed game failed");
            return Ok(local);
        }

        match self.games.get_by_igdb_id(igdb_id).await {
            Ok(Some(game)) => Ok(Some(game)),
            Ok(None) => Ok(local),
            Err(e) => {
                warn!(igdb_id, error = %e, "Rereading refreshed game failed");
                Ok(local)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────

    /// Search local and remote sources and return ranked results.
    ///
    /// Never fails: either source failing just drops its results.
    pub async fn search_games(
        &self,
        query: &str,
        filters: &SearchFilters,
        max_results: usize,
    ) -> Vec<SearchResult> {
        let query = normalize_query(query);
        if query.is_empty() {
            return Vec::new();
        }
        let max_results = if max_results == 0 {
            self.config.default_max_results
        } else {
            max_results
        };

        let key = cache_key(&query, filters);
        if let Some(mut hit) = self.cache.get(&key) {
            debug!(query = %query, "Search cache hit");
            hit.truncate(max_results);
            return hit;
        }

        let mut results = self
            .searches
            .run(&format!("search:{key}"), || self.search_uncached(&query, filters, &key))
            .await;
        results.truncate(max_results);
        results
    }

    async fn search_uncached(
        &self,
        query: &str,
        filters: &SearchFilters,
        key: &str,
    ) -> Vec<SearchResult> {
        let local_query = GameQuery::new(query, filters.clone(), self.config.local_limit);
        let skip_remote = is_common_query(query);
        let remote = async {
            if skip_remote {
                debug!(query, "Common query, skipping catalog");
                return None;
            }
            let fetched = self
                .breaker
                .call(
                    self.config.remote_timeout,
                    self.catalog.search_by_name(query, self.config.remote_limit),
                )
                .await;
            match fetched {
                Ok(entries) => Some(entries),
                Err(e) => {
                    warn!(query, error = %e, "Catalog search failed, using local results");
                    None
                }
            }
        };

        let (local, remote) = tokio::join!(self.games.search(&local_query), remote);
        let local = local.unwrap_or_else(|e| {
            warn!(query, error = %e, "Local search failed");
            Vec::new()
        });

        let now = self.clock.utc_now();
        let stale_after = TimeDelta::from_std(self.config.stale_after).unwrap_or(TimeDelta::MAX);
        let coverage = LocalCoverage {
            count: local.len(),
            any_stale: local.iter().any(|g| g.is_stale(now, stale_after)),
        };
        let local_results: Vec<SearchResult> = local.iter().map(SearchResult::from).collect();

        let remote: Vec<CatalogEntry> = remote
            .unwrap_or_default()
            .into_iter()
            .filter(|entry| filters.is_empty() || filters.accepts(&SearchResult::from(entry)))
            .collect();

        let reason = self.policy.decide(query, coverage);
        let results = if reason.merges() && !remote.is_empty() {
            let merged = merge(local_results, &remote, query);
            debug!(
                query,
                ?reason,
                local = coverage.count,
                new_remote = merged.new_entries.len(),
                "Merged catalog results"
            );
            // Matched rows go through the sync service too, which patches
            // what the local copy is missing.
            self.queue.add(remote);
            merged.results
        } else {
            let mut results = local_results;
            rank(&mut results, query);
            results
        };

        self.cache.set(key, results.clone());
        results
    }

    /// Local-only search with substring name match and filters.
    pub async fn search_games_exact(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<Game>, CoreError> {
        let local_query = GameQuery::new(normalize_query(query), filters.clone(), limit);
        let key = format!("exact:{}:{limit}", cache_key(&local_query.text, filters));
        self.lists
            .run(&key, || async {
                self.games
                    .search(&local_query)
                    .await
                    .map_err(CoreError::from)
            })
            .await
    }

    /// Games with at least one user rating, most rated first, then best
    /// average.
    pub async fn get_popular_games(&self, limit: usize) -> Result<Vec<Game>, CoreError> {
        self.lists
            .run(&format!("popular:{limit}"), || async move {
                self.games.popular(limit).await.map_err(CoreError::from)
            })
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Introspection
    // ─────────────────────────────────────────────────────────────────────────

    pub fn breaker_snapshot(&self) -> BreakerSnapshot {
        self.breaker.snapshot()
    }

    pub fn queue(&self) -> &Arc<SyncQueue> {
        &self.queue
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cached_searches(&self) -> usize {
        self.cache.len()
    }
}

impl std::fmt::Debug for GameService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameService")
            .field("config", &self.config)
            .field("breaker", &self.breaker)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::{CacheConfig, CircuitBreakerConfig, SyncConfig, SyncQueueConfig};
    use crate::domain::{GameOrigin, InvolvedCompany, NewGame, NewRating};
    use crate::memory::{InMemoryGameRepository, InMemoryRatingRepository};
    use crate::ports::CatalogError;
    use crate::ports::catalog::MockCatalogPort;
    use crate::search::FreshnessSampler;
    use std::time::Duration;

    struct Fixture {
        games: Arc<InMemoryGameRepository>,
        ratings: Arc<InMemoryRatingRepository>,
        clock: Arc<ManualClock>,
        service: GameService,
    }

    fn fixture(catalog: MockCatalogPort) -> Fixture {
        fixture_with(catalog, FreshnessSampler::never())
    }

    fn fixture_with(catalog: MockCatalogPort, sampler: FreshnessSampler) -> Fixture {
        let clock = Arc::new(ManualClock::new());
        let games = Arc::new(InMemoryGameRepository::with_clock(clock.clone()));
        let ratings = Arc::new(InMemoryRatingRepository::new(games.clone()));
        let sync = Arc::new(GameSyncService::new(
            games.clone(),
            SyncConfig::default(),
            clock.clone(),
        ));
        let queue = SyncQueue::new(sync.clone(), SyncQueueConfig::default());
        let deps = GameServiceDeps {
            games: games.clone(),
            ratings: ratings.clone(),
            catalog: Arc::new(catalog),
            sync,
            queue,
            breaker: Arc::new(CircuitBreaker::new(
                CircuitBreakerConfig::default(),
                clock.clone(),
            )),
            clock: clock.clone(),
        };
        let config = SearchConfig::default();
        let policy = MergePolicy::with_sampler(&config, sampler);
        let cache = ResultCache::new(CacheConfig::default(), clock.clone());
        Fixture {
            games,
            ratings,
            clock,
            service: GameService::with_policy(deps, config, cache, policy),
        }
    }

    fn complete(igdb_id: i64, name: &str) -> NewGame {
        let mut game = NewGame::new(igdb_id, format!("game-{igdb_id}"), name);
        game.summary = Some("summary".to_string());
        game.developer = Some("Dev".to_string());
        game.publisher = Some("Pub".to_string());
        game
    }

    fn full_entry(id: i64, name: &str) -> CatalogEntry {
        CatalogEntry::new(id, name)
            .with_summary("fresh summary")
            .with_company(InvolvedCompany::developer("Dev Studio"))
            .with_company(InvolvedCompany::publisher("Big Publisher"))
    }

    fn network() -> CatalogError {
        CatalogError::Network {
            message: "unreachable".to_string(),
        }
    }

    #[tokio::test]
    async fn test_blank_query_returns_nothing() {
        let f = fixture(MockCatalogPort::new());
        let results = f.service.search_games("   ", &SearchFilters::new(), 10).await;
        assert!(results.is_empty());
        assert_eq!(f.games.search_calls(), 0);
    }

    #[tokio::test]
    async fn test_common_query_skips_catalog() {
        let mut catalog = MockCatalogPort::new();
        catalog.expect_search_by_name().never();
        let f = fixture(catalog);
        f.games.insert(&complete(1, "Best Games Collection")).await.unwrap();

        let results = f.service.search_games("Games", &SearchFilters::new(), 10).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].origin, GameOrigin::Local);
    }

    #[tokio::test]
    async fn test_second_identical_search_is_served_from_cache() {
        let mut catalog = MockCatalogPort::new();
        catalog
            .expect_search_by_name()
            .times(1)
            .returning(|_, _| Ok(vec![CatalogEntry::new(50, "Celeste")]));
        let f = fixture(catalog);

        let first = f.service.search_games("celeste", &SearchFilters::new(), 10).await;
        let second = f.service.search_games("  CELESTE ", &SearchFilters::new(), 10).await;

        assert_eq!(first, second);
        assert_eq!(f.games.search_calls(), 1);
        assert_eq!(f.service.cached_searches(), 1);
    }

    #[tokio::test]
    async fn test_cache_expires() {
        let mut catalog = MockCatalogPort::new();
        catalog
            .expect_search_by_name()
            .times(2)
            .returning(|_, _| Ok(Vec::new()));
        let f = fixture(catalog);

        f.service.search_games("celeste", &SearchFilters::new(), 10).await;
        f.clock.advance(Duration::from_secs(301));
        f.service.search_games("celeste", &SearchFilters::new(), 10).await;

        assert_eq!(f.games.search_calls(), 2);
    }

    #[tokio::test]
    async fn test_catalog_failure_degrades_to_local() {
        let mut catalog = MockCatalogPort::new();
        catalog
            .expect_search_by_name()
            .returning(|_, _| Err(network()));
        let f = fixture(catalog);
        f.games.insert(&complete(1, "Hollow Knight")).await.unwrap();

        let results = f.service.search_games("hollow", &SearchFilters::new(), 10).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Hollow Knight");
    }

    #[tokio::test]
    async fn test_local_failure_still_returns_remote() {
        let mut catalog = MockCatalogPort::new();
        catalog
            .expect_search_by_name()
            .returning(|_, _| Ok(vec![CatalogEntry::new(9, "Hollow Knight")]));
        let f = fixture(catalog);
        f.games
            .fail_all_reads(Some(crate::ports::RepositoryError::Storage("locked".into())));

        let results = f.service.search_games("hollow", &SearchFilters::new(), 10).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].origin, GameOrigin::Remote);
    }

    #[tokio::test]
    async fn test_breaker_stops_catalog_calls_after_three_failures() {
        let mut catalog = MockCatalogPort::new();
        catalog
            .expect_search_by_name()
            .times(3)
            .returning(|_, _| Err(network()));
        let f = fixture(catalog);

        for query in ["alpha", "beta", "gamma", "delta"] {
            f.service.search_games(query, &SearchFilters::new(), 10).await;
        }

        assert_eq!(
            f.service.breaker_snapshot().state,
            crate::resilience::CircuitState::Open
        );
    }

    #[tokio::test]
    async fn test_well_covered_franchise_query_stays_local() {
        let mut catalog = MockCatalogPort::new();
        catalog
            .expect_search_by_name()
            .returning(|_, _| Ok(vec![CatalogEntry::new(999, "Zelda II")]));
        let f = fixture(catalog);
        for i in 1..=12 {
            f.games
                .insert(&complete(i, &format!("Zelda Chronicles {i}")))
                .await
                .unwrap();
        }

        let results = f.service.search_games("zelda chronicles", &SearchFilters::new(), 50).await;

        assert_eq!(results.len(), 12);
        assert!(results.iter().all(|r| r.origin == GameOrigin::Local));
        assert_eq!(f.service.queue().statistics().total_queued, 0);
    }

    #[tokio::test]
    async fn test_stale_franchise_results_merge_remote() {
        let mut catalog = MockCatalogPort::new();
        catalog
            .expect_search_by_name()
            .returning(|_, _| Ok(vec![CatalogEntry::new(999, "Zelda II")]));
        let f = fixture(catalog);
        for i in 1..=12 {
            f.games
                .insert(&complete(i, &format!("Zelda Chronicles {i}")))
                .await
                .unwrap();
        }
        f.clock.advance(Duration::from_secs(8 * 24 * 60 * 60));

        let results = f.service.search_games("zelda chronicles", &SearchFilters::new(), 50).await;

        assert_eq!(results.len(), 13);
        assert_eq!(f.service.queue().statistics().total_queued, 1);
    }

    #[tokio::test]
    async fn test_freshness_sample_merges_covered_franchise() {
        let mut catalog = MockCatalogPort::new();
        catalog
            .expect_search_by_name()
            .returning(|_, _| Ok(vec![CatalogEntry::new(999, "Zelda II")]));
        let f = fixture_with(catalog, FreshnessSampler::always());
        for i in 1..=12 {
            f.games
                .insert(&complete(i, &format!("Zelda Chronicles {i}")))
                .await
                .unwrap();
        }

        let results = f.service.search_games("zelda chronicles", &SearchFilters::new(), 50).await;
        assert_eq!(results.len(), 13);
    }

    #[tokio::test]
    async fn test_max_results_truncates_but_cache_keeps_all() {
        let mut catalog = MockCatalogPort::new();
        catalog.expect_search_by_name().times(1).returning(|_, _| {
            Ok((100..110)
                .map(|id| CatalogEntry::new(id, format!("Portal {id}")))
                .collect())
        });
        let f = fixture(catalog);

        let three = f.service.search_games("portal", &SearchFilters::new(), 3).await;
        let all = f.service.search_games("portal", &SearchFilters::new(), 50).await;

        assert_eq!(three.len(), 3);
        assert_eq!(all.len(), 10);
        assert_eq!(three[..], all[..3]);
    }

    #[tokio::test]
    async fn test_remote_results_respect_filters() {
        let mut catalog = MockCatalogPort::new();
        catalog.expect_search_by_name().returning(|_, _| {
            Ok(vec![
                CatalogEntry::new(1, "Doom").with_genres(["Shooter"]),
                CatalogEntry::new(2, "Doom Puzzle").with_genres(["Puzzle"]),
            ])
        });
        let f = fixture(catalog);

        let filters = SearchFilters::new().with_genre("shooter");
        let results = f.service.search_games("doom", &filters, 10).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].igdb_id, 1);
    }

    #[tokio::test]
    async fn test_complete_row_is_not_refreshed() {
        let mut catalog = MockCatalogPort::new();
        catalog.expect_get_by_id().never();
        let f = fixture(catalog);
        f.games.insert(&complete(7, "Celeste")).await.unwrap();

        let game = f.service.get_game_by_igdb_id(7).await.unwrap().unwrap();
        assert_eq!(game.name, "Celeste");
    }

    #[tokio::test]
    async fn test_incomplete_row_is_refreshed_from_catalog() {
        let mut catalog = MockCatalogPort::new();
        catalog
            .expect_get_by_id()
            .times(1)
            .returning(|id| Ok(Some(full_entry(id, "Celeste"))));
        let f = fixture(catalog);
        f.games
            .insert(&NewGame::new(7, "celeste", "Celeste"))
            .await
            .unwrap();

        let game = f.service.get_game_by_igdb_id(7).await.unwrap().unwrap();

        assert_eq!(game.summary.as_deref(), Some("fresh summary"));
        assert_eq!(game.developer.as_deref(), Some("Dev Studio"));
        assert_eq!(game.publisher.as_deref(), Some("Big Publisher"));
        assert!(!game.is_incomplete());
    }

    #[tokio::test]
    async fn test_missing_row_is_fetched_and_persisted() {
        let mut catalog = MockCatalogPort::new();
        catalog
            .expect_get_by_id()
            .returning(|id| Ok(Some(full_entry(id, "Outer Wilds"))));
        let f = fixture(catalog);

        let game = f.service.get_game_by_igdb_id(11737).await.unwrap().unwrap();

        assert_eq!(game.igdb_id, 11737);
        assert_eq!(game.slug, "outer-wilds");
        assert_eq!(f.games.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_returns_local_data() {
        let mut catalog = MockCatalogPort::new();
        catalog.expect_get_by_id().returning(|_| Err(network()));
        let f = fixture(catalog);
        f.games
            .insert(&NewGame::new(7, "celeste", "Celeste"))
            .await
            .unwrap();

        let game = f.service.get_game_by_igdb_id(7).await.unwrap().unwrap();
        assert!(game.summary.is_none());

        assert!(f.service.get_game_by_igdb_id(8).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reviews_are_joined_newest_first() {
        let mut catalog = MockCatalogPort::new();
        catalog.expect_get_by_id().never();
        let f = fixture(catalog);
        let game = f.games.insert(&complete(7, "Celeste")).await.unwrap();
        f.ratings.add_user(1, "ana");
        for (i, text) in ["first", "second"].iter().enumerate() {
            f.ratings
                .add_rating(&NewRating {
                    user_id: 1,
                    game_id: game.id,
                    rating: 8.0 + i as f64,
                    review: Some((*text).to_string()),
                })
                .await
                .unwrap();
        }

        let by_slug = f
            .service
            .get_game_with_full_reviews(&GameRef::parse("game-7"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(by_slug.game.id, game.id);
        let texts: Vec<_> = by_slug
            .reviews
            .iter()
            .filter_map(|r| r.review.as_deref())
            .collect();
        assert_eq!(texts, vec!["second", "first"]);
        assert_eq!(by_slug.reviews[0].author.username, "ana");

        let missing = f
            .service
            .get_game_with_full_reviews(&GameRef::Id(404))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_exact_search_and_popular() {
        let f = fixture(MockCatalogPort::new());
        let mut rpg = complete(1, "Persona 5");
        rpg.genres = vec!["RPG".to_string()];
        let p5 = f.games.insert(&rpg).await.unwrap();
        f.games.insert(&complete(2, "Persona 4 Arena")).await.unwrap();
        f.games.set_user_rating(p5.id, Some(9.5), 3);

        let exact = f
            .service
            .search_games_exact("persona", &SearchFilters::new().with_genre("rpg"), 10)
            .await
            .unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].name, "Persona 5");

        let popular = f.service.get_popular_games(10).await.unwrap();
        assert_eq!(popular.len(), 1);
        assert_eq!(popular[0].id, p5.id);
    }
}
