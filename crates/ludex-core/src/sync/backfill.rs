//! Bulk refresh of incomplete local rows from the catalog.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::patch::backfill_patch;
use super::transform::to_new_game;
use crate::clock::Clock;
use crate::config::{BackfillConfig, SyncConfig};
use crate::domain::{CatalogEntry, Game, GameChange, GameUpdate};
use crate::ports::{CatalogPort, CatalogResult, CoreError, GameRepository};

/// `data_source` stamped on rows written by the backfill.
pub const BACKFILL_SOURCE: &str = "backfill";

/// Totals for one backfill run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackfillReport {
    /// Incomplete rows found.
    pub total: usize,
    /// Rows whose catalog batch was fetched.
    pub processed: usize,
    pub updated: usize,
    /// Rows the catalog had no entry for.
    pub missing: usize,
    /// Rows whose fetch or write failed.
    pub failed: usize,
    pub elapsed: Duration,
}

impl BackfillReport {
    /// Processed rows per second.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.processed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Fetches incomplete rows from the catalog in parallel batches and fills
/// their gaps.
pub struct BackfillService {
    games: Arc<dyn GameRepository>,
    catalog: Arc<dyn CatalogPort>,
    config: BackfillConfig,
    clock: Arc<dyn Clock>,
}

impl BackfillService {
    pub fn new(
        games: Arc<dyn GameRepository>,
        catalog: Arc<dyn CatalogPort>,
        config: BackfillConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            games,
            catalog,
            config,
            clock,
        }
    }

    /// Run one full pass.
    pub async fn run(&self) -> Result<BackfillReport, CoreError> {
        let started = Instant::now();
        let rows = self
            .games
            .list_incomplete(self.config.limit.unwrap_or(usize::MAX))
            .await?;

        let mut report = BackfillReport {
            total: rows.len(),
            ..BackfillReport::default()
        };
        info!(rows = report.total, "Starting backfill");
        if rows.is_empty() {
            return Ok(report);
        }

        let batches: Vec<Vec<Game>> = rows
            .chunks(self.config.batch_size)
            .map(<[Game]>::to_vec)
            .collect();

        let mut fetches = stream::iter(batches)
            .map(|batch| async move {
                let ids: Vec<i64> = batch.iter().map(|g| g.igdb_id).collect();
                let fetched = self.catalog.get_by_ids(&ids).await;
                (batch, fetched)
            })
            .buffer_unordered(self.config.parallelism);

        while let Some((batch, fetched)) = fetches.next().await {
            self.apply_batch(&batch, fetched, &mut report).await;
            info!(
                processed = report.processed,
                total = report.total,
                updated = report.updated,
                "Backfill progress"
            );
        }

        report.elapsed = started.elapsed();
        info!(
            total = report.total,
            processed = report.processed,
            updated = report.updated,
            missing = report.missing,
            failed = report.failed,
            rows_per_sec = report.rate(),
            "Backfill complete"
        );
        Ok(report)
    }

    async fn apply_batch(
        &self,
        batch: &[Game],
        fetched: CatalogResult<Vec<CatalogEntry>>,
        report: &mut BackfillReport,
    ) {
        let entries = match fetched {
            Ok(entries) => entries,
            Err(e) => {
                warn!(rows = batch.len(), error = %e, "Backfill fetch failed");
                report.failed += batch.len();
                return;
            }
        };
        report.processed += batch.len();

        let sync_config = SyncConfig::default().with_data_source(BACKFILL_SOURCE);
        let now = self.clock.utc_now();
        let by_id: HashMap<i64, &CatalogEntry> = entries.iter().map(|e| (e.id, e)).collect();

        let updates: Vec<GameUpdate> = batch
            .iter()
            .filter_map(|row| {
                let entry = by_id.get(&row.igdb_id)?;
                let candidate = to_new_game(entry, &sync_config, now);
                Some(GameUpdate {
                    id: row.id,
                    igdb_id: row.igdb_id,
                    change: GameChange::Patch(backfill_patch(row, &candidate)),
                })
            })
            .collect();
        report.missing += batch.len() - updates.len();

        match self.games.update_many(&updates).await {
            Ok(n) => report.updated += n,
            Err(e) => {
                warn!(rows = updates.len(), error = %e, "Backfill batch write failed, writing rows one at a time");
                for update in &updates {
                    match self.games.update(update.id, &update.change).await {
                        Ok(()) => report.updated += 1,
                        Err(e) => {
                            warn!(igdb_id = update.igdb_id, error = %e, "Backfill row write failed");
                            report.failed += 1;
                        }
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for BackfillService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackfillService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::domain::{InvolvedCompany, NewGame};
    use crate::memory::InMemoryGameRepository;
    use crate::ports::CatalogError;
    use crate::ports::catalog::MockCatalogPort;

    async fn seeded(n: i64) -> Arc<InMemoryGameRepository> {
        let repo = Arc::new(InMemoryGameRepository::new());
        for i in 1..=n {
            let mut game = NewGame::new(i, format!("g{i}"), format!("Game {i}"));
            game.rating_count = Some(u32::try_from(i).unwrap() * 10);
            repo.insert(&game).await.unwrap();
        }
        repo
    }

    fn entry(id: i64) -> CatalogEntry {
        let mut e = CatalogEntry::new(id, format!("Game {id}"))
            .with_summary("filled")
            .with_company(InvolvedCompany::developer("Studio"));
        e.cover_url = Some("//images.igdb.com/igdb/image/upload/t_thumb/x.jpg".to_string());
        e
    }

    #[tokio::test]
    async fn test_fills_gaps_and_stamps_source() {
        let repo = seeded(3).await;
        let mut catalog = MockCatalogPort::new();
        catalog
            .expect_get_by_ids()
            .returning(|ids| Ok(ids.iter().filter(|id| **id != 2).map(|id| entry(*id)).collect()));

        let service = BackfillService::new(
            repo.clone(),
            Arc::new(catalog),
            BackfillConfig::default(),
            Arc::new(SystemClock),
        );
        let report = service.run().await.unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.processed, 3);
        assert_eq!(report.updated, 2);
        assert_eq!(report.missing, 1);

        let game = repo.get_by_igdb_id(1).await.unwrap().unwrap();
        assert_eq!(game.summary.as_deref(), Some("filled"));
        assert_eq!(game.data_source.as_deref(), Some(BACKFILL_SOURCE));
        assert!(game.last_synced.is_some());
        assert!(game.cover_url.as_deref().is_some_and(|u| u.starts_with("https://")));
    }

    #[tokio::test]
    async fn test_batches_respect_size_and_failures_are_counted() {
        let repo = seeded(5).await;
        let mut catalog = MockCatalogPort::new();
        catalog.expect_get_by_ids().times(3).returning(|ids| {
            assert!(ids.len() <= 2);
            if ids.contains(&1) {
                Err(CatalogError::RateLimited)
            } else {
                Ok(ids.iter().map(|id| entry(*id)).collect())
            }
        });

        let service = BackfillService::new(
            repo,
            Arc::new(catalog),
            BackfillConfig::default().with_batch_size(2).with_parallelism(2),
            Arc::new(SystemClock),
        );
        let report = service.run().await.unwrap();

        // Rows are fetched most-rated first: [5, 4], [3, 2], [1].
        assert_eq!(report.total, 5);
        assert_eq!(report.failed, 1);
        assert_eq!(report.updated, 4);
    }

    #[tokio::test]
    async fn test_nothing_to_do() {
        let repo = Arc::new(InMemoryGameRepository::new());
        let service = BackfillService::new(
            repo,
            Arc::new(MockCatalogPort::new()),
            BackfillConfig::default(),
            Arc::new(SystemClock),
        );
        let report = service.run().await.unwrap();
        assert_eq!(report, BackfillReport::default());
    }
}
