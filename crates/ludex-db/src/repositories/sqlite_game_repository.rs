//! `SQLite` implementation of the `GameRepository` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use ludex_core::{
    Clock, Game, GameChange, GameQuery, GameRepository, GameUpdate, NewGame, RepositoryError,
    SystemClock,
};

use super::row_mappers::{
    GAME_SELECT_COLUMNS, GameColumns, format_timestamp, row_to_game, storage_error,
};

/// `SQLite` implementation of the `GameRepository` trait.
///
/// Batch writes run inside a single transaction, so a failing row rolls
/// back the whole batch.
pub struct SqliteGameRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteGameRepository {
    /// Create a new `SQLite` game repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_clock(pool, Arc::new(SystemClock))
    }

    /// Stamp `created_at`/`updated_at` from the given clock.
    pub fn with_clock(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    async fn fetch_where(&self, clause: &str, value: i64) -> Result<Option<Game>, RepositoryError> {
        let query = format!("SELECT {GAME_SELECT_COLUMNS} FROM games WHERE {clause} = ?");
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;
        row.as_ref().map(row_to_game).transpose()
    }
}

/// Escape `LIKE` wildcards so user text matches literally.
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// First free slug out of `slug`, `slug-{igdb_id}`, `slug-{igdb_id}-2`, ...
async fn free_slug(conn: &mut SqliteConnection, game: &NewGame) -> Result<String, RepositoryError> {
    let mut candidate = game.slug.clone();
    for attempt in 1u32.. {
        let taken: Option<i64> = sqlx::query_scalar("SELECT id FROM games WHERE slug = ?")
            .bind(&candidate)
            .fetch_optional(&mut *conn)
            .await
            .map_err(storage_error)?;
        if taken.is_none() {
            break;
        }
        candidate = match attempt {
            1 => format!("{}-{}", game.slug, game.igdb_id),
            n => format!("{}-{}-{n}", game.slug, game.igdb_id),
        };
    }
    Ok(candidate)
}

async fn insert_row(
    conn: &mut SqliteConnection,
    game: &NewGame,
    now: DateTime<Utc>,
) -> Result<Game, RepositoryError> {
    let mut row = game.clone();
    row.slug = free_slug(conn, game).await?;

    let columns = GameColumns::from_new(&row)?;
    let stamp = format_timestamp(now);
    let id: i64 = sqlx::query_scalar(
        r#"INSERT INTO games (
            igdb_id, slug, name, summary, description, release_date, cover_url,
            screenshots, genres, platforms, developer, publisher, total_rating,
            aggregated_rating, rating_count, category, parent_game, franchise,
            collection, alternative_names, similar_game_ids, dlc_ids, expansion_ids,
            created_at, updated_at, last_synced, data_source
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id"#,
    )
    .bind(row.igdb_id)
    .bind(&row.slug)
    .bind(&row.name)
    .bind(&row.summary)
    .bind(&row.description)
    .bind(&columns.release_date)
    .bind(&row.cover_url)
    .bind(&columns.screenshots)
    .bind(&columns.genres)
    .bind(&columns.platforms)
    .bind(&row.developer)
    .bind(&row.publisher)
    .bind(row.total_rating)
    .bind(row.aggregated_rating)
    .bind(row.rating_count)
    .bind(columns.category)
    .bind(row.parent_game)
    .bind(&row.franchise)
    .bind(&row.collection)
    .bind(&columns.alternative_names)
    .bind(&columns.similar_game_ids)
    .bind(&columns.dlc_ids)
    .bind(&columns.expansion_ids)
    .bind(&stamp)
    .bind(&stamp)
    .bind(&columns.last_synced)
    .bind(&row.data_source)
    .fetch_one(&mut *conn)
    .await
    .map_err(storage_error)?;

    Ok(row.into_game(id, now, now))
}

/// Read the row, apply the change in memory and write every mutable column
/// back. Identity, slug and user aggregates are never written here.
async fn apply_change(
    conn: &mut SqliteConnection,
    clause: &str,
    key: i64,
    change: &GameChange,
    now: DateTime<Utc>,
) -> Result<(), RepositoryError> {
    let query = format!("SELECT {GAME_SELECT_COLUMNS} FROM games WHERE {clause} = ?");
    let row = sqlx::query(&query)
        .bind(key)
        .fetch_optional(&mut *conn)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| RepositoryError::NotFound(format!("game {clause}={key}")))?;

    let mut game = row_to_game(&row)?;
    change.apply_to(&mut game);
    let columns = GameColumns::from_game(&game)?;

    sqlx::query(
        r#"UPDATE games SET
            name = ?, summary = ?, description = ?, release_date = ?, cover_url = ?,
            screenshots = ?, genres = ?, platforms = ?, developer = ?, publisher = ?,
            total_rating = ?, aggregated_rating = ?, rating_count = ?, category = ?,
            parent_game = ?, franchise = ?, collection = ?, alternative_names = ?,
            similar_game_ids = ?, dlc_ids = ?, expansion_ids = ?, updated_at = ?,
            last_synced = ?, data_source = ?
        WHERE id = ?"#,
    )
    .bind(&game.name)
    .bind(&game.summary)
    .bind(&game.description)
    .bind(&columns.release_date)
    .bind(&game.cover_url)
    .bind(&columns.screenshots)
    .bind(&columns.genres)
    .bind(&columns.platforms)
    .bind(&game.developer)
    .bind(&game.publisher)
    .bind(game.total_rating)
    .bind(game.aggregated_rating)
    .bind(game.rating_count)
    .bind(columns.category)
    .bind(game.parent_game)
    .bind(&game.franchise)
    .bind(&game.collection)
    .bind(&columns.alternative_names)
    .bind(&columns.similar_game_ids)
    .bind(&columns.dlc_ids)
    .bind(&columns.expansion_ids)
    .bind(format_timestamp(now))
    .bind(&columns.last_synced)
    .bind(&game.data_source)
    .bind(game.id)
    .execute(&mut *conn)
    .await
    .map_err(storage_error)?;

    Ok(())
}

#[async_trait]
impl GameRepository for SqliteGameRepository {
    async fn get_by_id(&self, id: i64) -> Result<Option<Game>, RepositoryError> {
        self.fetch_where("id", id).await
    }

    async fn get_by_igdb_id(&self, igdb_id: i64) -> Result<Option<Game>, RepositoryError> {
        self.fetch_where("igdb_id", igdb_id).await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Game>, RepositoryError> {
        let query = format!("SELECT {GAME_SELECT_COLUMNS} FROM games WHERE slug = ?");
        let row = sqlx::query(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;
        row.as_ref().map(row_to_game).transpose()
    }

    async fn find_by_igdb_ids(&self, igdb_ids: &[i64]) -> Result<Vec<Game>, RepositoryError> {
        if igdb_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {GAME_SELECT_COLUMNS} FROM games WHERE igdb_id IN ("
        ));
        let mut ids = qb.separated(", ");
        for id in igdb_ids {
            ids.push_bind(*id);
        }
        qb.push(")");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;
        rows.iter().map(row_to_game).collect()
    }

    async fn search(&self, query: &GameQuery) -> Result<Vec<Game>, RepositoryError> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {GAME_SELECT_COLUMNS} FROM games WHERE 1 = 1"
        ));

        if !query.text.is_empty() {
            let pattern = like_pattern(&query.text);
            qb.push(" AND (LOWER(name) LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR LOWER(alternative_names) LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
        for (column, wanted) in [
            ("genres", &query.filters.genres),
            ("platforms", &query.filters.platforms),
        ] {
            for value in wanted {
                qb.push(format!(
                    " AND EXISTS (SELECT 1 FROM json_each(games.{column}) \
                     WHERE LOWER(json_each.value) = LOWER("
                ))
                .push_bind(value.clone())
                .push("))");
            }
        }
        if let Some(min) = query.filters.min_rating {
            qb.push(" AND total_rating >= ").push_bind(min);
        }
        if let Some(year) = query.filters.release_year {
            qb.push(" AND CAST(substr(release_date, 1, 4) AS INTEGER) = ")
                .push_bind(year);
        }
        qb.push(" ORDER BY COALESCE(rating_count, 0) DESC, name ASC LIMIT ")
            .push_bind(i64::try_from(query.limit).unwrap_or(i64::MAX));

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;
        rows.iter().map(row_to_game).collect()
    }

    async fn popular(&self, limit: usize) -> Result<Vec<Game>, RepositoryError> {
        let query = format!(
            "SELECT {GAME_SELECT_COLUMNS} FROM games WHERE user_rating_count > 0 \
             ORDER BY user_rating_count DESC, COALESCE(user_rating_avg, 0) DESC LIMIT ?"
        );
        let rows = sqlx::query(&query)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;
        rows.iter().map(row_to_game).collect()
    }

    async fn list_incomplete(&self, limit: usize) -> Result<Vec<Game>, RepositoryError> {
        let query = format!(
            "SELECT {GAME_SELECT_COLUMNS} FROM games WHERE igdb_id > 0 AND (
                cover_url IS NULL OR TRIM(cover_url) = ''
                OR summary IS NULL OR TRIM(summary) = ''
                OR developer IS NULL OR TRIM(developer) = ''
                OR release_date IS NULL
                OR last_synced IS NULL
            ) ORDER BY COALESCE(rating_count, 0) DESC LIMIT ?"
        );
        let rows = sqlx::query(&query)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;
        rows.iter().map(row_to_game).collect()
    }

    async fn insert(&self, game: &NewGame) -> Result<Game, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(storage_error)?;
        insert_row(&mut conn, game, self.clock.utc_now()).await
    }

    async fn insert_many(&self, games: &[NewGame]) -> Result<usize, RepositoryError> {
        let now = self.clock.utc_now();
        let mut tx = self.pool.begin().await.map_err(storage_error)?;
        for game in games {
            // Dropping the transaction on error rolls it back.
            insert_row(&mut tx, game, now).await?;
        }
        tx.commit().await.map_err(storage_error)?;
        debug!(rows = games.len(), "Inserted game batch");
        Ok(games.len())
    }

    async fn update(&self, id: i64, change: &GameChange) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(storage_error)?;
        apply_change(&mut conn, "id", id, change, self.clock.utc_now()).await
    }

    async fn update_many(&self, updates: &[GameUpdate]) -> Result<usize, RepositoryError> {
        let now = self.clock.utc_now();
        let mut tx = self.pool.begin().await.map_err(storage_error)?;
        for update in updates {
            apply_change(&mut tx, "igdb_id", update.igdb_id, &update.change, now).await?;
        }
        tx.commit().await.map_err(storage_error)?;
        debug!(rows = updates.len(), "Updated game batch");
        Ok(updates.len())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM games")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;
    use chrono::NaiveDate;
    use ludex_core::{GamePatch, SearchFilters};

    async fn repo() -> SqliteGameRepository {
        SqliteGameRepository::new(setup_test_database().await.unwrap())
    }

    fn game(igdb_id: i64, slug: &str, name: &str) -> NewGame {
        NewGame::new(igdb_id, slug, name)
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let repo = repo().await;
        let mut new = game(1942, "the-witcher-3", "The Witcher 3: Wild Hunt");
        new.genres = vec!["RPG".to_string(), "Adventure".to_string()];
        new.release_date = NaiveDate::from_ymd_opt(2015, 5, 19);
        new.rating_count = Some(3000);

        let inserted = repo.insert(&new).await.unwrap();
        let by_igdb = repo.get_by_igdb_id(1942).await.unwrap().unwrap();
        let by_slug = repo.get_by_slug("the-witcher-3").await.unwrap().unwrap();

        assert_eq!(by_igdb.id, inserted.id);
        assert_eq!(by_slug.genres, new.genres);
        assert_eq!(by_slug.release_date, new.release_date);
        assert_eq!(by_slug.rating_count, Some(3000));
        assert!(repo.get_by_id(inserted.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_slug_collision_gets_suffix_and_duplicate_id_rejected() {
        let repo = repo().await;
        repo.insert(&game(1, "doom", "DOOM")).await.unwrap();

        let second = repo.insert(&game(2, "doom", "Doom")).await.unwrap();
        assert_eq!(second.slug, "doom-2");

        let err = repo.insert(&game(1, "doom-again", "DOOM")).await.unwrap_err();
        assert!(err.is_duplicate());
    }

    #[tokio::test]
    async fn test_slug_suffix_keeps_counting_past_taken_fallback() {
        let repo = repo().await;
        repo.insert(&game(1, "doom", "DOOM")).await.unwrap();
        repo.insert(&game(5, "doom-2", "DOOM II")).await.unwrap();

        let third = repo.insert(&game(2, "doom", "Doom (2016)")).await.unwrap();
        assert_eq!(third.slug, "doom-2-2");
        let stored = repo.get_by_igdb_id(2).await.unwrap().unwrap();
        assert_eq!(stored.slug, "doom-2-2");
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_insert_many_is_all_or_nothing() {
        let repo = repo().await;
        repo.insert(&game(3, "three", "Three")).await.unwrap();

        let batch = vec![game(1, "one", "One"), game(2, "two", "Two"), game(3, "tri", "Tri")];
        assert!(repo.insert_many(&batch).await.unwrap_err().is_duplicate());
        assert_eq!(repo.count().await.unwrap(), 1);

        assert_eq!(repo.insert_many(&batch[..2]).await.unwrap(), 2);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_update_many_applies_patch_and_replace() {
        let repo = repo().await;
        repo.insert(&game(10, "celeste", "Celeste")).await.unwrap();
        let mut hades = game(11, "hades", "Hades");
        hades.developer = Some("Supergiant".to_string());
        repo.insert(&hades).await.unwrap();

        let mut replacement = game(11, "ignored", "Hades (2020)");
        replacement.summary = Some("Roguelike".to_string());
        let updates = vec![
            GameUpdate {
                id: 0,
                igdb_id: 10,
                change: GameChange::Patch(GamePatch {
                    summary: Some("Climb the mountain".to_string()),
                    ..GamePatch::default()
                }),
            },
            GameUpdate {
                id: 0,
                igdb_id: 11,
                change: GameChange::Replace(replacement),
            },
        ];
        assert_eq!(repo.update_many(&updates).await.unwrap(), 2);

        let celeste = repo.get_by_igdb_id(10).await.unwrap().unwrap();
        assert_eq!(celeste.summary.as_deref(), Some("Climb the mountain"));
        assert_eq!(celeste.name, "Celeste");

        let hades = repo.get_by_igdb_id(11).await.unwrap().unwrap();
        assert_eq!(hades.name, "Hades (2020)");
        assert_eq!(hades.slug, "hades");
        assert!(hades.developer.is_none());
    }

    #[tokio::test]
    async fn test_update_many_rolls_back_on_missing_row() {
        let repo = repo().await;
        repo.insert(&game(10, "celeste", "Celeste")).await.unwrap();
        let patch = GameChange::Patch(GamePatch {
            summary: Some("x".to_string()),
            ..GamePatch::default()
        });
        let updates = vec![
            GameUpdate { id: 0, igdb_id: 10, change: patch.clone() },
            GameUpdate { id: 0, igdb_id: 99, change: patch.clone() },
        ];

        let err = repo.update_many(&updates).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
        assert!(repo.get_by_igdb_id(10).await.unwrap().unwrap().summary.is_none());

        let err = repo.update(404, &patch).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_search_text_and_filters() {
        let repo = repo().await;
        let mut botw = game(1, "botw", "The Legend of Zelda: Breath of the Wild");
        botw.genres = vec!["Adventure".to_string()];
        botw.platforms = vec!["Switch".to_string()];
        botw.release_date = NaiveDate::from_ymd_opt(2017, 3, 3);
        botw.total_rating = Some(97.0);
        botw.rating_count = Some(2000);
        let mut links = game(2, "links-awakening", "Link's Awakening");
        links.alternative_names = vec!["Zelda: Link's Awakening".to_string()];
        links.genres = vec!["Adventure".to_string()];
        links.rating_count = Some(500);
        let other = game(3, "percent", "100% Orange Juice");
        repo.insert_many(&[botw, links, other]).await.unwrap();

        let hits = repo
            .search(&GameQuery::new("zelda", SearchFilters::new(), 10))
            .await
            .unwrap();
        let names: Vec<_> = hits.iter().map(|g| g.igdb_id).collect();
        assert_eq!(names, vec![1, 2]);

        let switch_only = SearchFilters::new().with_platform("switch").with_release_year(2017);
        let hits = repo
            .search(&GameQuery::new("zelda", switch_only, 10))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let rated = SearchFilters::new().with_min_rating(98.0);
        assert!(repo.search(&GameQuery::new("", rated, 10)).await.unwrap().is_empty());

        // Wildcards in the query match literally.
        let hits = repo
            .search(&GameQuery::new("100%", SearchFilters::new(), 10))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert!(repo
            .search(&GameQuery::new("_", SearchFilters::new(), 10))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_incomplete_orders_by_rating_count() {
        let repo = repo().await;
        let mut complete = game(1, "done", "Done");
        complete.cover_url = Some("https://img/1.jpg".to_string());
        complete.summary = Some("s".to_string());
        complete.developer = Some("d".to_string());
        complete.release_date = NaiveDate::from_ymd_opt(2020, 1, 1);
        complete.last_synced = Some(Utc::now());
        let mut popular = game(2, "popular", "Popular");
        popular.rating_count = Some(900);
        let mut niche = game(3, "niche", "Niche");
        niche.rating_count = Some(4);
        repo.insert_many(&[complete, niche, popular]).await.unwrap();

        let rows = repo.list_incomplete(10).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|g| g.igdb_id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(repo.list_incomplete(1).await.unwrap().len(), 1);
    }
}
