// src/events/mod.rs
//
// Internal Event System - Public API

pub mod bus;
pub mod types;

pub use types::DomainEvent;

pub use types::{
    // Provider mapping
    ProviderMappingRefreshed,
    ProviderMappingUnavailable,
    // Repair
    ProviderNumberingRepaired,
    // Overrides
    SceneOverrideChanged,
};

pub use bus::EventBus;
