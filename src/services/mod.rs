// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod clock;
pub mod refresh_tracker;
pub mod repair_service;
pub mod resolution_service;
pub mod sync_service;

#[cfg(test)]
mod sync_service_tests;
#[cfg(test)]
mod test_support;

// Re-export all services and their types
pub use clock::{Clock, FixedClock, SystemClock};

pub use refresh_tracker::RefreshTracker;

pub use sync_service::{ShowLocks, SyncOutcome, SyncService};

pub use resolution_service::{AbsoluteMap, ResolutionMap, ResolutionService};

pub use repair_service::{RepairReport, RepairService};
