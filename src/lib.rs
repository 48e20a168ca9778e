// src/lib.rs
// scenemap - Scene episode numbering resolution
//
// Architecture:
// - Three layers: local overrides > provider mapping > identity
// - Provider mapping (XEM) synced on demand, at most once per show per day
// - Repair pass keeps catalog numbering monotonic
// - Explicit: No implicit behavior, no global state

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;

// ============================================================================
// INTEGRATION LAYER
// ============================================================================

pub mod application;
pub mod integrations;
pub mod providers;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    validate_override_request,
    AbsoluteOverride,
    // Catalog
    CatalogEpisode,
    DomainError,
    EpisodeFieldUpdate,
    // Overrides
    EpisodeOverride,
    NumberingField,
    // Numbering
    ProviderKind,
    RefreshState,
    SeasonEpisode,
    SetOverrideRequest,
    ShowIdentity,
};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Configuration
// ============================================================================

pub use config::{EnrollmentSettings, NumberingConfig, ProviderSettings};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    DomainEvent,
    EventBus,
    ProviderMappingRefreshed,
    ProviderMappingUnavailable,
    ProviderNumberingRepaired,
    SceneOverrideChanged,
};

// ============================================================================
// PUBLIC API - Database
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    CatalogRepository,
    OverrideRepository,
    RefreshRepository,
    SqliteCatalogRepository,
    SqliteOverrideRepository,
    SqliteRefreshRepository,
};

// ============================================================================
// PUBLIC API - Providers & Integrations
// ============================================================================

pub use integrations::{MappingClient, MappingDocument, XemClient};
pub use providers::{ProviderRegistry, StaticProviderRegistry};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    AbsoluteMap,
    Clock,
    RefreshTracker,
    RepairReport,
    // Repair
    RepairService,
    ResolutionMap,
    // Resolution
    ResolutionService,
    SyncOutcome,
    // Sync
    SyncService,
    SystemClock,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::NumberingState;
