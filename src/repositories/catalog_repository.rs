// src/repositories/catalog_repository.rs
//
// Episode catalog access (tv_shows / tv_episodes)
//
// The catalog belongs to the surrounding episode-management service. This
// repository reads rows and updates numbering columns in place; it never
// inserts episodes except through the explicit ingestion helpers on the
// SQLite type.
//
// Every failure is reported as CatalogRead / CatalogWrite.

use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use std::sync::Arc;

use crate::db::ConnectionPool;
use crate::domain::{
    from_stored, to_stored, CatalogEpisode, EpisodeFieldUpdate, ProviderKind, SeasonEpisode,
    ShowIdentity,
};
use crate::error::{AppError, AppResult};

// ---------------------------------------------------------------------
// Repository contract
// ---------------------------------------------------------------------
pub trait CatalogRepository: Send + Sync {
    /// `None` when the show is unknown to the catalog
    fn is_scene_numbered(&self, show: &ShowIdentity) -> AppResult<Option<bool>>;

    /// All episodes of a show in native order (season, then episode)
    fn get_episodes(&self, show: &ShowIdentity) -> AppResult<Vec<CatalogEpisode>>;

    fn get_episode(
        &self,
        show: &ShowIdentity,
        native: SeasonEpisode,
    ) -> AppResult<Option<CatalogEpisode>>;

    /// First episode (native order) the provider mapped to `scene`
    fn find_by_scene(
        &self,
        show: &ShowIdentity,
        scene: SeasonEpisode,
    ) -> AppResult<Option<CatalogEpisode>>;

    /// First episode (native order) carrying native absolute `absolute_number`
    fn find_by_absolute(
        &self,
        show: &ShowIdentity,
        absolute_number: u32,
    ) -> AppResult<Option<CatalogEpisode>>;

    /// First episode (native order) the provider mapped to `scene_absolute`,
    /// optionally restricted to one native season
    fn find_by_scene_absolute(
        &self,
        show: &ShowIdentity,
        scene_absolute: u32,
        season: Option<u32>,
    ) -> AppResult<Option<CatalogEpisode>>;

    /// Update one numbering column of an existing row.
    /// Returns false when no row matched (rows are never created here).
    fn upsert_episode_field(&self, update: &EpisodeFieldUpdate) -> AppResult<bool>;

    /// Apply all updates in one transaction. Either every write lands or
    /// none does. Returns the number of rows touched.
    fn batch_apply(&self, updates: &[EpisodeFieldUpdate]) -> AppResult<usize>;
}

pub struct SqliteCatalogRepository {
    pool: Arc<ConnectionPool>,
}

const EPISODE_COLUMNS: &str = "indexer, showid, season, episode, absolute_number,
     scene_season, scene_episode, scene_absolute_number";

impl SqliteCatalogRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_episode(row: &Row) -> rusqlite::Result<CatalogEpisode> {
        let indexer: u32 = row.get("indexer")?;
        let showid: i64 = row.get("showid")?;

        Ok(CatalogEpisode {
            show: ShowIdentity::new(ProviderKind(indexer), showid as u64),
            season: row.get("season")?,
            episode: row.get("episode")?,
            absolute_number: Self::numbering_column(row, "absolute_number")?,
            scene_season: Self::numbering_column(row, "scene_season")?,
            scene_episode: Self::numbering_column(row, "scene_episode")?,
            scene_absolute_number: Self::numbering_column(row, "scene_absolute_number")?,
        })
    }

    /// Out-of-range values fail the read instead of reading as unset
    fn numbering_column(row: &Row, column: &str) -> rusqlite::Result<Option<u32>> {
        let stored: Option<i64> = row.get(column)?;
        from_stored(stored).map_err(|e| {
            let index = row.as_ref().column_index(column).unwrap_or(0);
            rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(e))
        })
    }

    fn query_one(
        &self,
        filter: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> AppResult<Option<CatalogEpisode>> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM tv_episodes WHERE indexer = ?1 AND showid = ?2 AND {}
             ORDER BY season, episode LIMIT 1",
            EPISODE_COLUMNS, filter
        );
        let episode = conn.query_row(&sql, params, Self::row_to_episode).optional()?;
        Ok(episode)
    }

    fn apply_update(conn: &rusqlite::Connection, update: &EpisodeFieldUpdate) -> AppResult<usize> {
        // column() only yields fixed column names
        let sql = format!(
            "UPDATE tv_episodes SET {} = ?1
             WHERE indexer = ?2 AND showid = ?3 AND season = ?4 AND episode = ?5",
            update.field.column()
        );
        let changed = conn.execute(
            &sql,
            params![
                to_stored(update.value),
                update.show.provider.id(),
                update.show.sql_id(),
                update.native.season,
                update.native.episode,
            ],
        )?;
        Ok(changed)
    }

    // ------------------------------------------------------------------
    // Ingestion helpers (catalog owner side)
    // ------------------------------------------------------------------

    /// Register or update a show row
    pub fn save_show(&self, show: &ShowIdentity, name: &str, is_scene: bool) -> AppResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO tv_shows (indexer, indexer_id, show_name, is_scene)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (indexer, indexer_id) DO UPDATE
             SET show_name = excluded.show_name, is_scene = excluded.is_scene",
            params![show.provider.id(), show.sql_id(), name, is_scene],
        )?;
        Ok(())
    }

    /// Insert or replace a full episode row
    pub fn save_episode(&self, episode: &CatalogEpisode) -> AppResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO tv_episodes ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                EPISODE_COLUMNS
            ),
            params![
                episode.show.provider.id(),
                episode.show.sql_id(),
                episode.season,
                episode.episode,
                to_stored(episode.absolute_number),
                to_stored(episode.scene_season),
                to_stored(episode.scene_episode),
                to_stored(episode.scene_absolute_number),
            ],
        )?;
        Ok(())
    }
}

// ---------------------------------------------------------------------
// SQLite Implementation
// ---------------------------------------------------------------------
impl CatalogRepository for SqliteCatalogRepository {
    fn is_scene_numbered(&self, show: &ShowIdentity) -> AppResult<Option<bool>> {
        let read = || -> AppResult<Option<bool>> {
            let conn = self.pool.get()?;
            let flag = conn
                .query_row(
                    "SELECT is_scene FROM tv_shows WHERE indexer = ?1 AND indexer_id = ?2",
                    params![show.provider.id(), show.sql_id()],
                    |row| row.get::<_, bool>(0),
                )
                .optional()?;
            Ok(flag)
        };
        read().map_err(AppError::into_catalog_read)
    }

    fn get_episodes(&self, show: &ShowIdentity) -> AppResult<Vec<CatalogEpisode>> {
        let read = || -> AppResult<Vec<CatalogEpisode>> {
            let conn = self.pool.get()?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM tv_episodes WHERE indexer = ?1 AND showid = ?2
                 ORDER BY season, episode",
                EPISODE_COLUMNS
            ))?;
            let episodes = stmt
                .query_map(params![show.provider.id(), show.sql_id()], Self::row_to_episode)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(episodes)
        };
        read().map_err(AppError::into_catalog_read)
    }

    fn get_episode(
        &self,
        show: &ShowIdentity,
        native: SeasonEpisode,
    ) -> AppResult<Option<CatalogEpisode>> {
        self.query_one(
            "season = ?3 AND episode = ?4",
            params![show.provider.id(), show.sql_id(), native.season, native.episode],
        )
        .map_err(AppError::into_catalog_read)
    }

    fn find_by_scene(
        &self,
        show: &ShowIdentity,
        scene: SeasonEpisode,
    ) -> AppResult<Option<CatalogEpisode>> {
        self.query_one(
            "scene_season = ?3 AND scene_episode = ?4",
            params![show.provider.id(), show.sql_id(), scene.season, scene.episode],
        )
        .map_err(AppError::into_catalog_read)
    }

    fn find_by_absolute(
        &self,
        show: &ShowIdentity,
        absolute_number: u32,
    ) -> AppResult<Option<CatalogEpisode>> {
        self.query_one(
            "absolute_number = ?3",
            params![show.provider.id(), show.sql_id(), absolute_number],
        )
        .map_err(AppError::into_catalog_read)
    }

    fn find_by_scene_absolute(
        &self,
        show: &ShowIdentity,
        scene_absolute: u32,
        season: Option<u32>,
    ) -> AppResult<Option<CatalogEpisode>> {
        let found = match season {
            Some(season) => self.query_one(
                "scene_absolute_number = ?3 AND season = ?4",
                params![show.provider.id(), show.sql_id(), scene_absolute, season],
            ),
            None => self.query_one(
                "scene_absolute_number = ?3",
                params![show.provider.id(), show.sql_id(), scene_absolute],
            ),
        };
        found.map_err(AppError::into_catalog_read)
    }

    fn upsert_episode_field(&self, update: &EpisodeFieldUpdate) -> AppResult<bool> {
        let write = || -> AppResult<bool> {
            let conn = self.pool.get()?;
            Ok(Self::apply_update(&conn, update)? > 0)
        };
        write().map_err(AppError::into_catalog_write)
    }

    fn batch_apply(&self, updates: &[EpisodeFieldUpdate]) -> AppResult<usize> {
        if updates.is_empty() {
            return Ok(0);
        }

        let write = || -> AppResult<usize> {
            let mut conn = self.pool.get()?;
            let tx = conn.transaction()?;
            let mut touched = 0;
            for update in updates {
                touched += Self::apply_update(&tx, update)?;
            }
            tx.commit()?;
            Ok(touched)
        };
        write().map_err(AppError::into_catalog_write)
    }
}
