// src/error/types.rs
use crate::domain::DomainError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Mapping service could not be reached, timed out or sent garbage.
    #[error("Remote mapping service unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Catalog read failed: {0}")]
    CatalogRead(String),

    #[error("Catalog write failed: {0}")]
    CatalogWrite(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::Pool(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::RemoteUnavailable(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// Re-tag a storage error raised while reading the catalog.
    pub fn into_catalog_read(self) -> Self {
        match self {
            AppError::CatalogRead(_) => self,
            other => AppError::CatalogRead(other.to_string()),
        }
    }

    /// Re-tag a storage error raised while writing the catalog.
    pub fn into_catalog_write(self) -> Self {
        match self {
            AppError::CatalogWrite(_) => self,
            other => AppError::CatalogWrite(other.to_string()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
