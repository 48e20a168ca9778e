// src/providers/mod.rs
//
// Provider (indexer) capability lookup

pub mod registry;

pub use registry::{ProviderRegistry, StaticProviderRegistry};
