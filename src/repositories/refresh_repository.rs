// src/repositories/refresh_repository.rs

use rusqlite::{params, OptionalExtension};
use std::sync::Arc;

use crate::db::ConnectionPool;
use crate::domain::{RefreshState, ShowIdentity};
use crate::error::AppResult;

pub trait RefreshRepository: Send + Sync {
    fn get(&self, show: &ShowIdentity) -> AppResult<Option<RefreshState>>;
    fn upsert(&self, state: &RefreshState) -> AppResult<()>;
}

pub struct SqliteRefreshRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteRefreshRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

impl RefreshRepository for SqliteRefreshRepository {
    fn get(&self, show: &ShowIdentity) -> AppResult<Option<RefreshState>> {
        let conn = self.pool.get()?;

        let last_refreshed: Option<i64> = conn
            .query_row(
                "SELECT last_refreshed FROM xem_refresh WHERE indexer = ?1 AND indexer_id = ?2",
                params![show.provider.id(), show.sql_id()],
                |row| row.get(0),
            )
            .optional()?;

        Ok(last_refreshed.map(|ts| RefreshState::new(*show, ts)))
    }

    fn upsert(&self, state: &RefreshState) -> AppResult<()> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO xem_refresh (indexer, indexer_id, last_refreshed)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (indexer, indexer_id) DO UPDATE
             SET last_refreshed = excluded.last_refreshed",
            params![state.show.provider.id(), state.show.sql_id(), state.last_refreshed],
        )?;

        Ok(())
    }
}
