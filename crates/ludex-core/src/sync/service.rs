//! Persisting catalog entries into the local store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::patch::plan_change;
use super::queue::CatalogSink;
use super::transform::{to_new_game, validate};
use crate::clock::Clock;
use crate::config::SyncConfig;
use crate::domain::{CatalogEntry, GameUpdate, NewGame};
use crate::ports::{CoreError, GameRepository};

/// Outcome of one sync call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub inserted: usize,
    pub updated: usize,
    /// Existing rows that needed no write.
    pub unchanged: usize,
    /// Entries rejected by validation.
    pub invalid: usize,
    /// Inserts that lost a race with another writer.
    pub duplicates: usize,
    /// Rows that could not be written.
    pub failed: usize,
}

impl SyncReport {
    /// Rows this call tried to write.
    pub const fn attempted(&self) -> usize {
        self.inserted + self.updated + self.duplicates + self.failed
    }
}

/// Running totals across all sync calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncMetrics {
    pub total_saved: u64,
    pub total_updated: u64,
    pub failed_saves: u64,
    pub calls: u64,
    /// Mean wall time of a sync call, in milliseconds.
    pub average_save_ms: f64,
}

impl SyncMetrics {
    fn record(&mut self, report: &SyncReport, elapsed: Duration) {
        self.total_saved += report.inserted as u64;
        self.total_updated += report.updated as u64;
        self.failed_saves += report.failed as u64;
        self.calls += 1;
        let ms = elapsed.as_secs_f64() * 1000.0;
        self.average_save_ms += (ms - self.average_save_ms) / self.calls as f64;
    }
}

/// Turns catalog entries into local rows: validates, transforms, then
/// inserts new games and patches or refreshes known ones.
pub struct GameSyncService {
    games: Arc<dyn GameRepository>,
    config: SyncConfig,
    clock: Arc<dyn Clock>,
    metrics: Mutex<SyncMetrics>,
}

impl GameSyncService {
    pub fn new(games: Arc<dyn GameRepository>, config: SyncConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            games,
            config,
            clock,
            metrics: Mutex::new(SyncMetrics::default()),
        }
    }

    pub fn metrics(&self) -> SyncMetrics {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Validate, transform and upsert catalog entries.
    ///
    /// Invalid entries are skipped. Only a failure to read the existing rows
    /// aborts the call; individual write failures are counted in the report.
    pub async fn save_games_from_catalog(
        &self,
        entries: &[CatalogEntry],
    ) -> Result<SyncReport, CoreError> {
        let started = Instant::now();
        let now = self.clock.utc_now();

        let mut invalid = 0;
        let candidates: Vec<NewGame> = entries
            .iter()
            .filter(|entry| match validate(entry, self.config.max_name_len) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Skipping invalid catalog entry");
                    invalid += 1;
                    false
                }
            })
            .map(|entry| to_new_game(entry, &self.config, now))
            .collect();

        let mut report = self.upsert(candidates).await?;
        report.invalid = invalid;

        let elapsed = started.elapsed();
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(&report, elapsed);
        info!(
            inserted = report.inserted,
            updated = report.updated,
            unchanged = report.unchanged,
            invalid = report.invalid,
            failed = report.failed,
            elapsed_ms = elapsed.as_millis() as u64,
            "Synced catalog entries"
        );
        Ok(report)
    }

    /// Insert new rows and update known ones, in chunks.
    pub async fn upsert(&self, candidates: Vec<NewGame>) -> Result<SyncReport, CoreError> {
        let mut report = SyncReport::default();

        // Last occurrence of an id wins.
        let mut by_id: HashMap<i64, NewGame> = HashMap::with_capacity(candidates.len());
        let mut order = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if by_id.insert(candidate.igdb_id, candidate.clone()).is_none() {
                order.push(candidate.igdb_id);
            }
        }
        if order.is_empty() {
            return Ok(report);
        }

        let existing = self.games.find_by_igdb_ids(&order).await?;
        let existing: HashMap<i64, _> = existing.into_iter().map(|g| (g.igdb_id, g)).collect();

        let now = self.clock.utc_now();
        let refresh_after =
            TimeDelta::from_std(self.config.full_refresh_after).unwrap_or(TimeDelta::MAX);

        let mut inserts = Vec::new();
        let mut updates = Vec::new();
        for igdb_id in order {
            let Some(candidate) = by_id.remove(&igdb_id) else {
                continue;
            };
            match existing.get(&igdb_id) {
                None => inserts.push(candidate),
                Some(row) => match plan_change(row, &candidate, now, refresh_after) {
                    Some(change) => updates.push(GameUpdate {
                        id: row.id,
                        igdb_id,
                        change,
                    }),
                    None => report.unchanged += 1,
                },
            }
        }

        for chunk in inserts.chunks(self.config.chunk_size) {
            self.insert_chunk(chunk, &mut report).await;
        }
        for chunk in updates.chunks(self.config.chunk_size) {
            self.update_chunk(chunk, &mut report).await;
        }

        Ok(report)
    }

    async fn insert_chunk(&self, chunk: &[NewGame], report: &mut SyncReport) {
        match self.games.insert_many(chunk).await {
            Ok(n) => {
                report.inserted += n;
                return;
            }
            Err(e) => {
                warn!(error = %e, rows = chunk.len(), "Batch insert failed, inserting rows one at a time");
            }
        }

        for game in chunk {
            match self.games.insert(game).await {
                Ok(_) => report.inserted += 1,
                Err(e) if e.is_duplicate() => {
                    debug!(igdb_id = game.igdb_id, "Game already persisted");
                    report.duplicates += 1;
                }
                Err(e) => {
                    warn!(igdb_id = game.igdb_id, error = %e, "Failed to insert game");
                    report.failed += 1;
                }
            }
        }
    }

    async fn update_chunk(&self, chunk: &[GameUpdate], report: &mut SyncReport) {
        match self.games.update_many(chunk).await {
            Ok(n) => {
                report.updated += n;
                return;
            }
            Err(e) => {
                warn!(error = %e, rows = chunk.len(), "Batch update failed, updating rows one at a time");
            }
        }

        for update in chunk {
            match self.games.update(update.id, &update.change).await {
                Ok(()) => report.updated += 1,
                Err(e) => {
                    warn!(igdb_id = update.igdb_id, error = %e, "Failed to update game");
                    report.failed += 1;
                }
            }
        }
    }
}

#[async_trait]
impl CatalogSink for GameSyncService {
    /// Fails when nothing could be written, so the queue retries the batch.
    async fn persist(&self, batch: &[CatalogEntry]) -> Result<SyncReport, CoreError> {
        let report = self.save_games_from_catalog(batch).await?;
        if report.failed > 0 && report.failed == report.attempted() {
            return Err(CoreError::Internal(format!(
                "none of {} rows could be written",
                report.failed
            )));
        }
        Ok(report)
    }
}

impl std::fmt::Debug for GameSyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSyncService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
