// src/application/mod.rs
//
// Application Layer - composition root
//
// Wires configuration, storage, the mapping client and the services into
// one shareable state object for the host.

pub mod state;

pub use state::NumberingState;
