// src/db/connection.rs
//
// Database connection management
//
// PRINCIPLES:
// - Explicit connection pooling
// - No hidden connection creation
// - Clear error propagation
// - Thread-safe access

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

use crate::config::NumberingConfig;
use crate::error::{AppError, AppResult};

/// Type alias for connection pool
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Create a connection pool from configuration
///
/// Pool configuration:
/// - `pool_size` connections (15 by default)
/// - SQLite in WAL mode for better concurrency
/// - Busy timeout set so concurrent writers queue instead of failing
pub fn create_connection_pool(config: &NumberingConfig) -> AppResult<ConnectionPool> {
    let db_path = config.resolve_database_path()?;
    create_file_pool(&db_path, config.pool_size)
}

/// Create a pool over an explicit database file
pub fn create_file_pool(db_path: &Path, max_size: u32) -> AppResult<ConnectionPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    });

    let pool = Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| AppError::Pool(format!("Failed to create connection pool: {}", e)))?;

    Ok(pool)
}

/// Create a single-connection in-memory pool (for tests and tooling)
///
/// Every `memory()` connection is its own database, so the pool is capped at
/// one connection to keep a single shared database alive.
pub fn create_memory_pool() -> AppResult<ConnectionPool> {
    let manager = SqliteConnectionManager::memory().with_init(|conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(())
    });

    Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|e| AppError::Pool(format!("Failed to create memory pool: {}", e)))
}
