// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic
// - NO event emission
// - NO cross-repository calls
// - Explicit SQL only

pub mod catalog_repository;
pub mod override_repository;
pub mod refresh_repository;

pub use catalog_repository::{CatalogRepository, SqliteCatalogRepository};
pub use override_repository::{OverrideRepository, SqliteOverrideRepository};
pub use refresh_repository::{RefreshRepository, SqliteRefreshRepository};
