// src/integrations/mod.rs
//
// External Integrations Module

pub mod xem;

pub use xem::client::{MappingClient, XemClient};
pub use xem::document::{MappingDocument, MappingEntry, SceneMapping, XemNumber};

#[cfg(test)]
pub use xem::client::MockMappingClient;
