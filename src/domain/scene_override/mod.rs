pub mod entity;
pub mod invariants;

pub use entity::{AbsoluteOverride, EpisodeOverride, SetOverrideRequest};
pub use invariants::validate_override_request;
