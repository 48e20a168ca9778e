// src/integrations/xem/client.rs
//
// TheXEM mapping client
//
// ARCHITECTURE:
// - Blocking HTTP client (callers are synchronous)
// - Every request is bounded by the caller-supplied timeout
// - Maps the wire payload to MappingDocument; NO catalog mutation here
//
// CRITICAL RULES:
// - This is INFRASTRUCTURE, not DOMAIN
// - Transport, status and parse failures all become RemoteUnavailable

use log::debug;
use reqwest::blocking::Client;
use reqwest::header;
use std::time::Duration;

use super::document::MappingDocument;
use crate::config::DEFAULT_MAPPING_BASE_URL;
use crate::error::{AppError, AppResult};

/// Fetches raw provider mapping documents.
#[cfg_attr(test, mockall::automock)]
pub trait MappingClient: Send + Sync {
    /// Full scene mapping for one show, numbered from `origin`.
    ///
    /// An empty response body yields an empty document, not an error.
    fn fetch_mapping_document(
        &self,
        show_id: u64,
        origin: &str,
        timeout: Duration,
    ) -> AppResult<MappingDocument>;
}

pub struct XemClient {
    base_url: String,
    http_client: Client,
}

impl XemClient {
    pub fn new() -> AppResult<Self> {
        Self::with_base_url(DEFAULT_MAPPING_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> AppResult<Self> {
        let http_client = Client::builder()
            .user_agent(concat!("scenemap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn mapping_url(&self) -> String {
        format!("{}/map/all", self.base_url)
    }
}

impl MappingClient for XemClient {
    fn fetch_mapping_document(
        &self,
        show_id: u64,
        origin: &str,
        timeout: Duration,
    ) -> AppResult<MappingDocument> {
        let url = self.mapping_url();
        debug!("GET {} id={} origin={}", url, show_id, origin);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("id", show_id.to_string().as_str()),
                ("origin", origin),
                ("destination", "scene"),
            ])
            .header(header::ACCEPT, "application/json")
            .timeout(timeout)
            .send()
            .map_err(|e| AppError::RemoteUnavailable(format!("XEM request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::RemoteUnavailable(format!(
                "XEM returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .map_err(|e| AppError::RemoteUnavailable(format!("Failed to read XEM response: {}", e)))?;

        if body.trim().is_empty() {
            return Ok(MappingDocument::default());
        }

        serde_json::from_str(&body)
            .map_err(|e| AppError::RemoteUnavailable(format!("Failed to parse XEM response: {}", e)))
    }
}
