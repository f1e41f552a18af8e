//! In-memory repository implementations.
//!
//! Used by tests across the workspace and for running the services without
//! a database. Both repositories are safe to share between tasks. The game
//! repository also exposes a few failure switches so callers can exercise
//! their error paths.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::clock::{Clock, SystemClock};
use crate::domain::{
    Game, GameChange, GameQuery, GameUpdate, NewGame, NewRating, Review, Reviewer, is_blank,
};
use crate::ports::{GameRepository, RatingRepository, RepositoryError};

// ─────────────────────────────────────────────────────────────────────────────
// Games
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct GameTable {
    rows: Vec<Game>,
    next_id: i64,
    fail_batches: bool,
    fail_writes: Option<RepositoryError>,
    fail_reads: Option<RepositoryError>,
    race_rows: Vec<NewGame>,
    batch_writes: usize,
    search_calls: usize,
}

impl GameTable {
    fn by_igdb(&self, igdb_id: i64) -> Option<usize> {
        self.rows.iter().position(|g| g.igdb_id == igdb_id)
    }

    fn unique_slug(&self, game: &NewGame) -> String {
        let taken = |slug: &str| self.rows.iter().any(|g| g.slug == slug);
        if !taken(&game.slug) {
            return game.slug.clone();
        }
        let base = format!("{}-{}", game.slug, game.igdb_id);
        let mut candidate = base.clone();
        let mut n = 1;
        while taken(&candidate) {
            n += 1;
            candidate = format!("{base}-{n}");
        }
        candidate
    }

    fn push(&mut self, game: &NewGame, clock: &dyn Clock) -> Result<Game, RepositoryError> {
        if self.by_igdb(game.igdb_id).is_some() {
            return Err(RepositoryError::AlreadyExists(format!(
                "igdb_id={}",
                game.igdb_id
            )));
        }
        let now = clock.utc_now();
        self.next_id += 1;
        let mut row = game.clone();
        row.slug = self.unique_slug(game);
        let row = row.into_game(self.next_id, now, now);
        self.rows.push(row.clone());
        Ok(row)
    }

    fn check_read(&self) -> Result<(), RepositoryError> {
        self.fail_reads.clone().map_or(Ok(()), Err)
    }

    fn check_write(&self) -> Result<(), RepositoryError> {
        self.fail_writes.clone().map_or(Ok(()), Err)
    }

    fn check_batch(&mut self, clock: &dyn Clock) -> Result<(), RepositoryError> {
        for row in std::mem::take(&mut self.race_rows) {
            let _ = self.push(&row, clock);
        }
        self.check_write()?;
        if self.fail_batches {
            return Err(RepositoryError::Storage("batch write rejected".to_string()));
        }
        Ok(())
    }
}

/// Game table held in a `Vec` behind a mutex.
pub struct InMemoryGameRepository {
    table: Mutex<GameTable>,
    clock: Arc<dyn Clock>,
}

impl InMemoryGameRepository {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Stamp `created_at`/`updated_at` from the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Mutex::new(GameTable::default()),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, GameTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a fully-formed row, bypassing slug and timestamp handling.
    pub fn seed(&self, game: Game) {
        let mut table = self.lock();
        table.next_id = table.next_id.max(game.id);
        table.rows.push(game);
    }

    /// Snapshot of every row.
    pub fn all(&self) -> Vec<Game> {
        self.lock().rows.clone()
    }

    /// Make `insert_many` and `update_many` fail.
    pub fn fail_batches(&self, fail: bool) {
        self.lock().fail_batches = fail;
    }

    /// Make every write fail with `error`, or clear with `None`.
    pub fn fail_all_writes(&self, error: Option<RepositoryError>) {
        self.lock().fail_writes = error;
    }

    /// Make every read fail with `error`, or clear with `None`.
    pub fn fail_all_reads(&self, error: Option<RepositoryError>) {
        self.lock().fail_reads = error;
    }

    /// Insert `game` as a concurrent writer would, right before the next
    /// batch write.
    pub fn race_next_batch(&self, game: NewGame) {
        self.lock().race_rows.push(game);
    }

    /// Number of batch write calls so far.
    pub fn batch_writes(&self) -> usize {
        self.lock().batch_writes
    }

    /// Number of `search` calls so far.
    pub fn search_calls(&self) -> usize {
        self.lock().search_calls
    }

    /// Overwrite the user rating aggregate of a row.
    pub fn set_user_rating(&self, game_id: i64, average: Option<f64>, count: u32) {
        let mut table = self.lock();
        if let Some(game) = table.rows.iter_mut().find(|g| g.id == game_id) {
            game.user_rating_avg = average;
            game.user_rating_count = count;
        }
    }
}

impl Default for InMemoryGameRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryGameRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryGameRepository")
            .field("rows", &self.lock().rows.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    async fn get_by_id(&self, id: i64) -> Result<Option<Game>, RepositoryError> {
        let table = self.lock();
        table.check_read()?;
        Ok(table.rows.iter().find(|g| g.id == id).cloned())
    }

    async fn get_by_igdb_id(&self, igdb_id: i64) -> Result<Option<Game>, RepositoryError> {
        let table = self.lock();
        table.check_read()?;
        Ok(table.rows.iter().find(|g| g.igdb_id == igdb_id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Game>, RepositoryError> {
        let table = self.lock();
        table.check_read()?;
        Ok(table.rows.iter().find(|g| g.slug == slug).cloned())
    }

    async fn find_by_igdb_ids(&self, igdb_ids: &[i64]) -> Result<Vec<Game>, RepositoryError> {
        let table = self.lock();
        table.check_read()?;
        Ok(table
            .rows
            .iter()
            .filter(|g| igdb_ids.contains(&g.igdb_id))
            .cloned()
            .collect())
    }

    async fn search(&self, query: &GameQuery) -> Result<Vec<Game>, RepositoryError> {
        let mut table = self.lock();
        table.search_calls += 1;
        table.check_read()?;
        let mut hits: Vec<Game> = table
            .rows
            .iter()
            .filter(|g| query.matches(g))
            .cloned()
            .collect();
        hits.sort_by(|a, b| {
            b.rating_count
                .cmp(&a.rating_count)
                .then_with(|| a.name.cmp(&b.name))
        });
        hits.truncate(query.limit);
        Ok(hits)
    }

    async fn popular(&self, limit: usize) -> Result<Vec<Game>, RepositoryError> {
        let table = self.lock();
        table.check_read()?;
        let mut rated: Vec<Game> = table
            .rows
            .iter()
            .filter(|g| g.user_rating_count > 0)
            .cloned()
            .collect();
        rated.sort_by(|a, b| {
            b.user_rating_count.cmp(&a.user_rating_count).then_with(|| {
                b.user_rating_avg
                    .unwrap_or(0.0)
                    .total_cmp(&a.user_rating_avg.unwrap_or(0.0))
            })
        });
        rated.truncate(limit);
        Ok(rated)
    }

    async fn list_incomplete(&self, limit: usize) -> Result<Vec<Game>, RepositoryError> {
        let table = self.lock();
        table.check_read()?;
        let mut rows: Vec<Game> = table
            .rows
            .iter()
            .filter(|g| {
                g.igdb_id > 0
                    && (is_blank(g.cover_url.as_deref())
                        || is_blank(g.summary.as_deref())
                        || is_blank(g.developer.as_deref())
                        || g.release_date.is_none()
                        || g.last_synced.is_none())
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.rating_count.unwrap_or(0).cmp(&a.rating_count.unwrap_or(0)));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn insert(&self, game: &NewGame) -> Result<Game, RepositoryError> {
        let mut table = self.lock();
        table.check_write()?;
        table.push(game, self.clock.as_ref())
    }

    async fn insert_many(&self, games: &[NewGame]) -> Result<usize, RepositoryError> {
        let mut table = self.lock();
        table.check_batch(self.clock.as_ref())?;
        table.batch_writes += 1;

        let mut seen = Vec::with_capacity(games.len());
        for game in games {
            if table.by_igdb(game.igdb_id).is_some() || seen.contains(&game.igdb_id) {
                return Err(RepositoryError::AlreadyExists(format!(
                    "igdb_id={}",
                    game.igdb_id
                )));
            }
            seen.push(game.igdb_id);
        }
        for game in games {
            table.push(game, self.clock.as_ref())?;
        }
        Ok(games.len())
    }

    async fn update(&self, id: i64, change: &GameChange) -> Result<(), RepositoryError> {
        let mut table = self.lock();
        table.check_write()?;
        let now = self.clock.utc_now();
        let game = table
            .rows
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("game {id}")))?;
        change.apply_to(game);
        game.updated_at = now;
        Ok(())
    }

    async fn update_many(&self, updates: &[GameUpdate]) -> Result<usize, RepositoryError> {
        let mut table = self.lock();
        table.check_batch(self.clock.as_ref())?;
        table.batch_writes += 1;

        let mut positions = Vec::with_capacity(updates.len());
        for update in updates {
            let pos = table.by_igdb(update.igdb_id).ok_or_else(|| {
                RepositoryError::NotFound(format!("igdb_id={}", update.igdb_id))
            })?;
            positions.push(pos);
        }
        let now = self.clock.utc_now();
        for (pos, update) in positions.into_iter().zip(updates) {
            let game = &mut table.rows[pos];
            update.change.apply_to(game);
            game.updated_at = now;
        }
        Ok(updates.len())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let table = self.lock();
        table.check_read()?;
        Ok(table.rows.len() as u64)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Ratings
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct RatingTable {
    users: HashMap<i64, Reviewer>,
    reviews: Vec<Review>,
    next_id: i64,
}

/// Rating table that keeps the aggregate on an [`InMemoryGameRepository`]
/// up to date.
#[derive(Debug)]
pub struct InMemoryRatingRepository {
    games: Arc<InMemoryGameRepository>,
    table: Mutex<RatingTable>,
}

impl InMemoryRatingRepository {
    pub fn new(games: Arc<InMemoryGameRepository>) -> Self {
        Self {
            games,
            table: Mutex::new(RatingTable::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RatingTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a user who can author reviews.
    pub fn add_user(&self, id: i64, username: impl Into<String>) -> Reviewer {
        let reviewer = Reviewer {
            id,
            username: username.into(),
            display_name: None,
            avatar_url: None,
        };
        self.lock().users.insert(id, reviewer.clone());
        reviewer
    }
}

#[async_trait]
impl RatingRepository for InMemoryRatingRepository {
    async fn reviews_for_game(&self, game_id: i64) -> Result<Vec<Review>, RepositoryError> {
        let mut reviews: Vec<Review> = self
            .lock()
            .reviews
            .iter()
            .filter(|r| r.game_id == game_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(reviews)
    }

    async fn add_rating(&self, rating: &NewRating) -> Result<Review, RepositoryError> {
        if self.games.get_by_id(rating.game_id).await?.is_none() {
            return Err(RepositoryError::NotFound(format!("game {}", rating.game_id)));
        }

        let (review, average, count) = {
            let mut table = self.lock();
            let author = table
                .users
                .get(&rating.user_id)
                .cloned()
                .ok_or_else(|| RepositoryError::NotFound(format!("user {}", rating.user_id)))?;
            table.next_id += 1;
            let review = Review {
                id: table.next_id,
                game_id: rating.game_id,
                rating: rating.rating,
                review: rating.review.clone(),
                created_at: Utc::now(),
                author,
            };
            table.reviews.push(review.clone());

            let ratings: Vec<f64> = table
                .reviews
                .iter()
                .filter(|r| r.game_id == rating.game_id)
                .map(|r| r.rating)
                .collect();
            let count = ratings.len();
            let average = ratings.iter().sum::<f64>() / count as f64;
            (review, average, count)
        };

        self.games.set_user_rating(
            rating.game_id,
            Some(average),
            u32::try_from(count).unwrap_or(u32::MAX),
        );
        Ok(review)
    }

    async fn count_for_game(&self, game_id: i64) -> Result<u64, RepositoryError> {
        Ok(self
            .lock()
            .reviews
            .iter()
            .filter(|r| r.game_id == game_id)
            .count() as u64)
    }
}
