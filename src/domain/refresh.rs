use serde::{Deserialize, Serialize};

use crate::domain::numbering::ShowIdentity;

/// Default provider mapping freshness window: one day.
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 86_400;

/// Last time a provider sync was ATTEMPTED for a show (epoch seconds).
///
/// Failed attempts count; this is what rate-limits retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshState {
    pub show: ShowIdentity,
    pub last_refreshed: i64,
}

impl RefreshState {
    pub fn new(show: ShowIdentity, last_refreshed: i64) -> Self {
        Self {
            show,
            last_refreshed,
        }
    }

    /// Stale once strictly more than `ttl_secs` have passed.
    pub fn is_stale_at(&self, now: i64, ttl_secs: i64) -> bool {
        now - self.last_refreshed > ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::numbering::ProviderKind;

    #[test]
    fn test_staleness_boundary() {
        let state = RefreshState::new(ShowIdentity::new(ProviderKind::TVDB, 9), 1_000);
        assert!(!state.is_stale_at(1_000, DEFAULT_REFRESH_TTL_SECS));
        assert!(!state.is_stale_at(1_000 + DEFAULT_REFRESH_TTL_SECS, DEFAULT_REFRESH_TTL_SECS));
        assert!(state.is_stale_at(1_001 + DEFAULT_REFRESH_TTL_SECS, DEFAULT_REFRESH_TTL_SECS));
    }
}
