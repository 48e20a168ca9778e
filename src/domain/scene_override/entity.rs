use serde::{Deserialize, Serialize};

use crate::domain::numbering::{SeasonEpisode, ShowIdentity};

/// User-set mapping from a native (season, episode) to scene numbering.
///
/// `scene == None` is a cleared row: it still exists in storage but maps
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeOverride {
    pub show: ShowIdentity,
    pub native: SeasonEpisode,
    pub scene: Option<SeasonEpisode>,
}

/// User-set mapping from a native absolute number to a scene absolute number.
///
/// Independent from any `EpisodeOverride` of the same show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsoluteOverride {
    pub show: ShowIdentity,
    pub absolute_number: u32,
    pub scene_absolute: Option<u32>,
}

/// Explicit user action against the local override store.
///
/// Passing `None` as the scene value clears the mapping; there is no other
/// way to remove one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SetOverrideRequest {
    Episode {
        native: SeasonEpisode,
        scene: Option<SeasonEpisode>,
    },
    Absolute {
        absolute_number: u32,
        scene_absolute: Option<u32>,
    },
}

impl SetOverrideRequest {
    pub fn episode(native: SeasonEpisode, scene: Option<SeasonEpisode>) -> Self {
        Self::Episode { native, scene }
    }

    pub fn absolute(absolute_number: u32, scene_absolute: Option<u32>) -> Self {
        Self::Absolute {
            absolute_number,
            scene_absolute,
        }
    }

    pub fn is_clear(&self) -> bool {
        match self {
            Self::Episode { scene, .. } => scene.is_none(),
            Self::Absolute { scene_absolute, .. } => scene_absolute.is_none(),
        }
    }
}

impl EpisodeOverride {
    pub fn is_mapped(&self) -> bool {
        self.scene.is_some()
    }
}

impl AbsoluteOverride {
    pub fn is_mapped(&self) -> bool {
        self.scene_absolute.is_some()
    }
}
