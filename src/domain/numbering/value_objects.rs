// src/domain/numbering/value_objects.rs
//
// Numbering value objects
//
// RULES:
// - Value objects are immutable and compared by value
// - Zero is never a mapped number; it only exists at the storage boundary
// - from_stored / to_stored / non_sentinel are the ONLY places zero is translated

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{DomainError, DomainResult};

// ============================================================================
// PROVIDER / SHOW IDENTITY
// ============================================================================

/// Numeric identifier of an indexer (metadata provider).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderKind(pub u32);

impl ProviderKind {
    pub const TVDB: ProviderKind = ProviderKind(1);
    pub const TVRAGE: ProviderKind = ProviderKind(2);

    pub fn id(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Show scope used by every store: (provider kind, provider show id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShowIdentity {
    pub provider: ProviderKind,
    pub show_id: u64,
}

impl ShowIdentity {
    pub fn new(provider: ProviderKind, show_id: u64) -> Self {
        Self { provider, show_id }
    }

    /// A show id of zero means the caller did not know the show.
    pub fn is_complete(&self) -> bool {
        self.show_id != 0
    }

    /// Show id as bound into SQL (SQLite integers are signed 64-bit).
    pub(crate) fn sql_id(&self) -> i64 {
        self.show_id as i64
    }
}

impl fmt::Display for ShowIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.show_id)
    }
}

// ============================================================================
// SEASON / EPISODE PAIR
// ============================================================================

/// A (season, episode) pair, native or scene depending on context.
///
/// Ordering is season first, then episode, which is the native episode order
/// used by bulk maps and the repair pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeasonEpisode {
    pub season: u32,
    pub episode: u32,
}

impl SeasonEpisode {
    pub fn new(season: u32, episode: u32) -> Self {
        Self { season, episode }
    }

    /// Season 0 is a valid (specials) season; episode 0 is never valid.
    pub fn is_complete(&self) -> bool {
        self.episode != 0
    }
}

impl fmt::Display for SeasonEpisode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:02}E{:02}", self.season, self.episode)
    }
}

// ============================================================================
// CATALOG NUMBERING FIELDS
// ============================================================================

/// The four numbering columns of a catalog episode that this crate writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberingField {
    AbsoluteNumber,
    SceneSeason,
    SceneEpisode,
    SceneAbsoluteNumber,
}

impl NumberingField {
    pub const ALL: [NumberingField; 4] = [
        NumberingField::AbsoluteNumber,
        NumberingField::SceneSeason,
        NumberingField::SceneEpisode,
        NumberingField::SceneAbsoluteNumber,
    ];

    /// Column name in the catalog table. Never user-supplied.
    pub fn column(&self) -> &'static str {
        match self {
            NumberingField::AbsoluteNumber => "absolute_number",
            NumberingField::SceneSeason => "scene_season",
            NumberingField::SceneEpisode => "scene_episode",
            NumberingField::SceneAbsoluteNumber => "scene_absolute_number",
        }
    }

    /// Absolute numbers identify a single episode each, so a repeat of the
    /// previous value is as wrong as a regression.
    pub fn is_absolute(&self) -> bool {
        matches!(
            self,
            NumberingField::AbsoluteNumber | NumberingField::SceneAbsoluteNumber
        )
    }
}

impl fmt::Display for NumberingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ============================================================================
// STORAGE TRANSLATION
// ============================================================================

/// Stored integer -> optional number. Zero and NULL are "unset".
///
/// Negative values and values beyond `u32::MAX` are corrupt rows, never
/// "unset": treating them as holes would let a repair overwrite them.
pub fn from_stored(value: Option<i64>) -> DomainResult<Option<u32>> {
    match value {
        None | Some(0) => Ok(None),
        Some(v) => u32::try_from(v).map(Some).map_err(|_| {
            DomainError::InvariantViolation(format!("stored number {} is out of range", v))
        }),
    }
}

/// Provider-sent number -> optional number. Zero is "unset".
pub fn non_sentinel(value: u32) -> Option<u32> {
    Some(value).filter(|v| *v != 0)
}

/// Optional number -> stored integer, using the zero sentinel.
pub fn to_stored(value: Option<u32>) -> i64 {
    value.map(i64::from).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_never_a_number() {
        assert_eq!(from_stored(Some(0)).unwrap(), None);
        assert_eq!(from_stored(None).unwrap(), None);
        assert_eq!(from_stored(Some(12)).unwrap(), Some(12));
        assert_eq!(non_sentinel(0), None);
        assert_eq!(non_sentinel(4), Some(4));
    }

    #[test]
    fn test_out_of_range_stored_numbers_are_rejected() {
        assert_eq!(
            from_stored(Some(i64::from(u32::MAX))).unwrap(),
            Some(u32::MAX)
        );
        assert!(matches!(
            from_stored(Some(5_000_000_000)),
            Err(DomainError::InvariantViolation(_))
        ));
        assert!(matches!(
            from_stored(Some(-3)),
            Err(DomainError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_to_stored_uses_sentinel() {
        assert_eq!(to_stored(None), 0);
        assert_eq!(to_stored(Some(7)), 7);
    }

    #[test]
    fn test_season_episode_orders_by_season_first() {
        let mut pairs = vec![
            SeasonEpisode::new(2, 1),
            SeasonEpisode::new(1, 10),
            SeasonEpisode::new(1, 2),
            SeasonEpisode::new(0, 5),
        ];
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                SeasonEpisode::new(0, 5),
                SeasonEpisode::new(1, 2),
                SeasonEpisode::new(1, 10),
                SeasonEpisode::new(2, 1),
            ]
        );
    }

    #[test]
    fn test_completeness() {
        assert!(SeasonEpisode::new(0, 1).is_complete());
        assert!(!SeasonEpisode::new(1, 0).is_complete());
        assert!(!ShowIdentity::new(ProviderKind::TVDB, 0).is_complete());
        assert_eq!(ShowIdentity::new(ProviderKind::TVDB, 81797).to_string(), "1:81797");
    }
}
