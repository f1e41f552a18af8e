//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - Database pool and repositories (via ludex-db)
//! - Remote catalog client (via ludex-igdb)
//! - Core services (via ludex-core)
//!
//! Command handlers receive the composed `CliContext` and delegate work to
//! `LudexCore`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use ludex_core::{
    CatalogEntry, CatalogError, CatalogPort, CatalogResult, CoreConfig, LudexCore, Repos,
};
use ludex_db::{CoreFactory, setup_database};
use ludex_igdb::{IgdbCatalog, IgdbClientConfig};
use tracing::{info, warn};

const APP_DIR: &str = "ludex";
const DATABASE_FILE: &str = "ludex.db";

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Database location; `None` means the platform data directory.
    pub database: Option<PathBuf>,
    /// IGDB credentials; `None` runs without a remote catalog.
    pub igdb: Option<IgdbClientConfig>,
    /// Service tuning.
    pub core: CoreConfig,
}

impl CliConfig {
    /// Config from global arguments, with defaults for the rest.
    pub fn from_args(
        database: Option<PathBuf>,
        client_id: Option<String>,
        access_token: Option<String>,
    ) -> Self {
        let igdb = match (client_id, access_token) {
            (Some(id), Some(token)) => Some(IgdbClientConfig::new(id, token)),
            _ => None,
        };
        Self {
            database,
            igdb,
            core: CoreConfig::default(),
        }
    }

    #[must_use]
    pub fn with_core(mut self, core: CoreConfig) -> Self {
        self.core = core;
        self
    }

    /// Resolved database path.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir().context("No platform data directory; pass --database")?;
        Ok(data_dir.join(APP_DIR).join(DATABASE_FILE))
    }
}

/// Stand-in catalog used when no IGDB credentials are configured.
///
/// Every call fails with a non-transient error, so searches degrade to
/// local results without tripping the circuit breaker.
#[derive(Debug, Default)]
pub struct OfflineCatalog;

impl OfflineCatalog {
    fn unavailable() -> CatalogError {
        CatalogError::AuthRequired {
            message: "set TWITCH_CLIENT_ID and TWITCH_APP_ACCESS_TOKEN to enable IGDB".to_string(),
        }
    }
}

#[async_trait]
impl CatalogPort for OfflineCatalog {
    async fn search_by_name(&self, _term: &str, _limit: usize) -> CatalogResult<Vec<CatalogEntry>> {
        Err(Self::unavailable())
    }

    async fn get_by_id(&self, _id: i64) -> CatalogResult<Option<CatalogEntry>> {
        Err(Self::unavailable())
    }

    async fn get_by_ids(&self, _ids: &[i64]) -> CatalogResult<Vec<CatalogEntry>> {
        Err(Self::unavailable())
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    /// The core application facade.
    pub core: LudexCore,
    /// Remote catalog, for commands that talk to it directly.
    pub catalog: Arc<dyn CatalogPort>,
    /// Where the database lives, for display.
    pub database_path: Option<PathBuf>,
}

impl CliContext {
    /// Access the core facade.
    pub const fn core(&self) -> &LudexCore {
        &self.core
    }

    /// Access the remote catalog.
    pub const fn catalog(&self) -> &Arc<dyn CatalogPort> {
        &self.catalog
    }

    /// Let background persistence finish before the process exits.
    pub async fn shutdown(&self) {
        self.core.queue().wait_idle().await;
    }
}

fn build_catalog(igdb: Option<&IgdbClientConfig>) -> Result<Arc<dyn CatalogPort>> {
    match igdb {
        Some(config) => {
            let client = IgdbCatalog::new(config).context("Failed to create IGDB client")?;
            Ok(Arc::new(client))
        }
        None => {
            warn!("IGDB credentials not configured, using local data only");
            Ok(Arc::new(OfflineCatalog))
        }
    }
}

/// Bootstrap the CLI application.
///
/// 1. Resolves the database path and creates the pool with full schema setup
/// 2. Creates the IGDB catalog client (or the offline stand-in)
/// 3. Assembles `LudexCore` from repositories, catalog and config
///
/// Must be called inside a tokio runtime so the sync queue can start.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let db_path = config.database_path()?;
    let pool = setup_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    let catalog = build_catalog(config.igdb.as_ref())?;
    info!(database = %db_path.display(), "Bootstrapped ludex");

    let repos = CoreFactory::build_repos(pool);
    let mut ctx = bootstrap_with(repos, catalog, config.core);
    ctx.database_path = Some(db_path);
    Ok(ctx)
}

/// Bootstrap with custom repos and catalog (for testing).
pub fn bootstrap_with(
    repos: Repos,
    catalog: Arc<dyn CatalogPort>,
    config: CoreConfig,
) -> CliContext {
    let core = LudexCore::new(repos, catalog.clone(), config);
    CliContext {
        core,
        catalog,
        database_path: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_database_path_wins() {
        let config = CliConfig::from_args(Some(PathBuf::from("/tmp/x.db")), None, None);
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn test_partial_credentials_mean_offline() {
        let config = CliConfig::from_args(None, Some("id".into()), None);
        assert!(config.igdb.is_none());
        let config = CliConfig::from_args(None, Some("id".into()), Some("token".into()));
        assert!(config.igdb.is_some());
    }

    #[tokio::test]
    async fn test_offline_catalog_is_not_transient() {
        let err = OfflineCatalog.search_by_name("zelda", 5).await.unwrap_err();
        assert!(!err.is_transient());
    }
}
