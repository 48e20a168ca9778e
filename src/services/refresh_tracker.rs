// src/services/refresh_tracker.rs
//
// Provider mapping freshness
//
// A show is stale when it was never attempted, or when more than the TTL
// has passed since the last attempt. Attempts are stamped BEFORE the
// fetch, so a failing remote is retried at most once per TTL.

use std::sync::Arc;

use crate::domain::{RefreshState, ShowIdentity, DEFAULT_REFRESH_TTL_SECS};
use crate::error::AppResult;
use crate::repositories::RefreshRepository;
use crate::services::clock::Clock;

pub struct RefreshTracker {
    repo: Arc<dyn RefreshRepository>,
    clock: Arc<dyn Clock>,
    ttl_secs: i64,
}

impl RefreshTracker {
    pub fn new(repo: Arc<dyn RefreshRepository>, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(repo, clock, DEFAULT_REFRESH_TTL_SECS)
    }

    pub fn with_ttl(repo: Arc<dyn RefreshRepository>, clock: Arc<dyn Clock>, ttl_secs: i64) -> Self {
        Self {
            repo,
            clock,
            ttl_secs,
        }
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    pub fn is_stale(&self, show: &ShowIdentity) -> AppResult<bool> {
        let stale = match self.repo.get(show)? {
            Some(state) => state.is_stale_at(self.now(), self.ttl_secs),
            None => true,
        };
        Ok(stale)
    }

    /// Record a sync attempt at `now`. A stamp never moves backwards.
    pub fn mark_attempted(&self, show: &ShowIdentity, now: i64) -> AppResult<()> {
        let stamp = match self.repo.get(show)? {
            Some(state) if state.last_refreshed > now => state.last_refreshed,
            _ => now,
        };
        self.repo.upsert(&RefreshState::new(*show, stamp))
    }
}
