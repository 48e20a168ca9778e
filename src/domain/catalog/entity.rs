use serde::{Deserialize, Serialize};

use crate::domain::numbering::{NumberingField, SeasonEpisode, ShowIdentity};

/// One catalog row, as seen by this crate.
///
/// The scene fields here are the PROVIDER-SOURCED layer. User overrides live
/// in a separate store and are never written into these fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEpisode {
    pub show: ShowIdentity,
    pub season: u32,
    pub episode: u32,
    pub absolute_number: Option<u32>,
    pub scene_season: Option<u32>,
    pub scene_episode: Option<u32>,
    pub scene_absolute_number: Option<u32>,
}

impl CatalogEpisode {
    /// A bare row with no numbering beyond its key
    pub fn new(show: ShowIdentity, season: u32, episode: u32) -> Self {
        Self {
            show,
            season,
            episode,
            absolute_number: None,
            scene_season: None,
            scene_episode: None,
            scene_absolute_number: None,
        }
    }

    pub fn native(&self) -> SeasonEpisode {
        SeasonEpisode::new(self.season, self.episode)
    }

    /// Provider scene (season, episode), if the provider mapped one.
    ///
    /// A mapping needs a scene episode. The scene season may be unset, in
    /// which case the mapping points into season 0 (specials).
    pub fn scene_numbering(&self) -> Option<SeasonEpisode> {
        self.scene_episode
            .map(|episode| SeasonEpisode::new(self.scene_season.unwrap_or(0), episode))
    }

    pub fn field(&self, field: NumberingField) -> Option<u32> {
        match field {
            NumberingField::AbsoluteNumber => self.absolute_number,
            NumberingField::SceneSeason => self.scene_season,
            NumberingField::SceneEpisode => self.scene_episode,
            NumberingField::SceneAbsoluteNumber => self.scene_absolute_number,
        }
    }

    pub fn set_field(&mut self, field: NumberingField, value: Option<u32>) {
        match field {
            NumberingField::AbsoluteNumber => self.absolute_number = value,
            NumberingField::SceneSeason => self.scene_season = value,
            NumberingField::SceneEpisode => self.scene_episode = value,
            NumberingField::SceneAbsoluteNumber => self.scene_absolute_number = value,
        }
    }
}

/// A single keyed write against one numbering column of one catalog row.
///
/// Keyed by native (season, episode), never by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeFieldUpdate {
    pub show: ShowIdentity,
    pub native: SeasonEpisode,
    pub field: NumberingField,
    pub value: Option<u32>,
}

impl EpisodeFieldUpdate {
    pub fn new(
        show: ShowIdentity,
        native: SeasonEpisode,
        field: NumberingField,
        value: Option<u32>,
    ) -> Self {
        Self {
            show,
            native,
            field,
            value,
        }
    }
}
