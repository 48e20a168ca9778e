pub mod entity;

pub use entity::{CatalogEpisode, EpisodeFieldUpdate};
