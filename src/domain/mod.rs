// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// This file MUST declare all domain modules and re-export their public API.
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod catalog;
pub mod numbering;
pub mod refresh;
pub mod scene_override;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Numbering value objects
pub use numbering::{
    from_stored, non_sentinel, to_stored, NumberingField, ProviderKind, SeasonEpisode, ShowIdentity,
};

// Local override store
pub use scene_override::{
    validate_override_request, AbsoluteOverride, EpisodeOverride, SetOverrideRequest,
};

// Catalog (provider-sourced layer)
pub use catalog::{CatalogEpisode, EpisodeFieldUpdate};

// Refresh tracking
pub use refresh::{RefreshState, DEFAULT_REFRESH_TTL_SECS};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
