// src/db/mod.rs
//
// Database module
//
// Provides:
// - Connection pooling
// - Schema migrations

pub mod connection;
pub mod migrations;

pub use connection::{create_connection_pool, create_file_pool, create_memory_pool, ConnectionPool};

pub use migrations::initialize_database;
