pub mod value_objects;

pub use value_objects::{
    from_stored, non_sentinel, to_stored, NumberingField, ProviderKind, SeasonEpisode, ShowIdentity,
};
