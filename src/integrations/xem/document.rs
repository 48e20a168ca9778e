// src/integrations/xem/document.rs
//
// Mapping document as returned by the XEM "map/all" endpoint.
//
// Only structural presence is checked. Entries whose origin or scene
// numbering is missing or malformed are skipped, not rejected.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::domain::SeasonEpisode;

/// Keys of the scene numberings inside one entry. `scene_2` is the second
/// half of a double episode and points at the same native episode.
const SCENE_KEYS: [&str; 2] = ["scene", "scene_2"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MappingDocument {
    #[serde(default)]
    pub result: String,
    #[serde(default, deserialize_with = "entries_or_empty")]
    pub data: Vec<MappingEntry>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One entry: numbering keyed by source name ("scene", "tvdb", "anidb", ...)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct MappingEntry(pub HashMap<String, serde_json::Value>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XemNumber {
    pub season: u32,
    pub episode: u32,
    #[serde(default)]
    pub absolute: u32,
}

/// A scene numbering that belongs on the native episode `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneMapping {
    pub origin: SeasonEpisode,
    pub scene: XemNumber,
}

/// Failure documents sometimes carry `{}` or null instead of a list.
fn entries_or_empty<'de, D>(deserializer: D) -> Result<Vec<MappingEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

impl MappingDocument {
    /// Any result containing "success" counts, so qualified results such as
    /// "success (cached)" still merge.
    pub fn is_success(&self) -> bool {
        self.result.contains("success")
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All scene mappings in document order, keyed by the numbering found
    /// under `origin`.
    pub fn scene_mappings(&self, origin: &str) -> Vec<SceneMapping> {
        self.data
            .iter()
            .flat_map(|entry| entry.scene_mappings(origin))
            .collect()
    }
}

impl MappingEntry {
    pub fn numbering(&self, key: &str) -> Option<XemNumber> {
        self.0
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn scene_mappings(&self, origin: &str) -> Vec<SceneMapping> {
        let Some(native) = self.numbering(origin) else {
            return Vec::new();
        };
        let origin = SeasonEpisode::new(native.season, native.episode);

        SCENE_KEYS
            .iter()
            .filter_map(|key| self.numbering(key))
            .map(|scene| SceneMapping { origin, scene })
            .collect()
    }
}
