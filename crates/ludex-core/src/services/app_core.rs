//! `LudexCore` - the primary application facade.
//!
//! This is the composition root for core services. Adapters (the CLI today)
//! receive a `LudexCore` instance and use it to access all functionality.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::CoreConfig;
use crate::ports::{CatalogPort, Repos};
use crate::resilience::CircuitBreaker;
use crate::search::ResultCache;
use crate::sync::{BackfillService, GameSyncService, SyncQueue};

use super::game_service::{GameService, GameServiceDeps};

/// The core application facade.
///
/// Owns one instance of every service, wired to the given repositories and
/// catalog. Nothing here is global; build as many as you like.
///
/// # Example
///
/// ```ignore
/// let repos = ludex_db::CoreFactory::build_repos(&pool);
/// let catalog = Arc::new(IgdbCatalog::new(config)?);
/// let core = LudexCore::new(repos, catalog, CoreConfig::default());
///
/// let hits = core.games().search_games("zelda", &SearchFilters::new(), 10).await;
/// ```
pub struct LudexCore {
    games: GameService,
    sync: Arc<GameSyncService>,
    queue: Arc<SyncQueue>,
    backfill: BackfillService,
}

impl LudexCore {
    /// Create a new `LudexCore` on the system clock.
    pub fn new(repos: Repos, catalog: Arc<dyn CatalogPort>, config: CoreConfig) -> Self {
        Self::with_clock(repos, catalog, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        repos: Repos,
        catalog: Arc<dyn CatalogPort>,
        config: CoreConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let sync = Arc::new(GameSyncService::new(
            repos.games.clone(),
            config.sync.clone(),
            clock.clone(),
        ));
        let queue = SyncQueue::new(sync.clone(), config.queue);
        queue.start();
        let breaker = Arc::new(CircuitBreaker::new(config.breaker, clock.clone()));
        let cache = ResultCache::new(config.cache, clock.clone());

        let games = GameService::new(
            GameServiceDeps {
                games: repos.games.clone(),
                ratings: repos.ratings,
                catalog: catalog.clone(),
                sync: sync.clone(),
                queue: queue.clone(),
                breaker,
                clock: clock.clone(),
            },
            config.search,
            cache,
        );
        let backfill = BackfillService::new(repos.games, catalog, config.backfill, clock);

        Self {
            games,
            sync,
            queue,
            backfill,
        }
    }

    /// Access the game service.
    pub const fn games(&self) -> &GameService {
        &self.games
    }

    /// Access the sync service.
    pub fn sync(&self) -> &GameSyncService {
        &self.sync
    }

    /// Access the background sync queue.
    pub const fn queue(&self) -> &Arc<SyncQueue> {
        &self.queue
    }

    /// Access the bulk backfill.
    pub const fn backfill(&self) -> &BackfillService {
        &self.backfill
    }
}
