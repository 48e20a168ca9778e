// src/events/types.rs
//
// All numbering events.
// Each event represents an immutable fact that has already occurred.
//
// CRITICAL RULES:
// - Events are facts, not commands
// - Events are immutable
// - Events carry only the data needed to react

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ShowIdentity;

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

// ============================================================================
// LOCAL OVERRIDE EVENTS
// ============================================================================

/// Emitted after a user override was written (set or cleared)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneOverrideChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub show: ShowIdentity,
    /// "S01E02" or "absolute 12"
    pub target: String,
    pub cleared: bool,
}

impl SceneOverrideChanged {
    pub fn new(show: ShowIdentity, target: String, cleared: bool) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            show,
            target,
            cleared,
        }
    }
}

impl DomainEvent for SceneOverrideChanged {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "SceneOverrideChanged" }
}

// ============================================================================
// PROVIDER MAPPING EVENTS
// ============================================================================

/// Emitted when a provider mapping document was merged into the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMappingRefreshed {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub show: ShowIdentity,
    pub mappings: usize,
    pub forced: bool,
}

impl ProviderMappingRefreshed {
    pub fn new(show: ShowIdentity, mappings: usize, forced: bool) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            show,
            mappings,
            forced,
        }
    }
}

impl DomainEvent for ProviderMappingRefreshed {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "ProviderMappingRefreshed" }
}

/// Emitted when a sync attempt could not reach or parse the mapping service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMappingUnavailable {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub show: ShowIdentity,
    pub reason: String,
}

impl ProviderMappingUnavailable {
    pub fn new(show: ShowIdentity, reason: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            show,
            reason,
        }
    }
}

impl DomainEvent for ProviderMappingUnavailable {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "ProviderMappingUnavailable" }
}

// ============================================================================
// REPAIR EVENTS
// ============================================================================

/// Emitted after a repair pass wrote corrections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderNumberingRepaired {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub show: ShowIdentity,
    pub episodes_scanned: usize,
    pub writes: usize,
}

impl ProviderNumberingRepaired {
    pub fn new(show: ShowIdentity, episodes_scanned: usize, writes: usize) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            show,
            episodes_scanned,
            writes,
        }
    }
}

impl DomainEvent for ProviderNumberingRepaired {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "ProviderNumberingRepaired" }
}
