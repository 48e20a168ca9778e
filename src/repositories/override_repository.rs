// src/repositories/override_repository.rs
//
// Local override store (scene_numbering table)
//
// Episode-keyed and absolute-keyed records are separate rows. Writing one
// kind never touches the other. NULL scene columns mean "unset".

use rusqlite::{params, OptionalExtension, Row};
use std::sync::Arc;

use crate::db::ConnectionPool;
use crate::domain::{AbsoluteOverride, EpisodeOverride, SeasonEpisode, ShowIdentity};
use crate::error::AppResult;

// ---------------------------------------------------------------------
// Repository contract
// ---------------------------------------------------------------------
pub trait OverrideRepository: Send + Sync {
    /// Mapped episode override for a native pair, if any
    fn find_episode_override(
        &self,
        show: &ShowIdentity,
        native: SeasonEpisode,
    ) -> AppResult<Option<EpisodeOverride>>;

    /// Mapped absolute override for a native absolute number, if any
    fn find_absolute_override(
        &self,
        show: &ShowIdentity,
        absolute_number: u32,
    ) -> AppResult<Option<AbsoluteOverride>>;

    /// Reverse index: native pair whose override maps to `scene`
    fn find_native_by_scene(
        &self,
        show: &ShowIdentity,
        scene: SeasonEpisode,
    ) -> AppResult<Option<SeasonEpisode>>;

    /// Reverse index: native absolute whose override maps to `scene_absolute`
    fn find_absolute_by_scene_absolute(
        &self,
        show: &ShowIdentity,
        scene_absolute: u32,
    ) -> AppResult<Option<u32>>;

    /// All mapped episode overrides, ordered by season then episode
    fn list_episode_overrides(&self, show: &ShowIdentity) -> AppResult<Vec<EpisodeOverride>>;

    /// All mapped absolute overrides, ordered by absolute number
    fn list_absolute_overrides(&self, show: &ShowIdentity) -> AppResult<Vec<AbsoluteOverride>>;

    fn save_episode_override(&self, record: &EpisodeOverride) -> AppResult<()>;

    fn save_absolute_override(&self, record: &AbsoluteOverride) -> AppResult<()>;
}

pub struct SqliteOverrideRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteOverrideRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_episode_override(
        show: ShowIdentity,
        row: &Row,
    ) -> rusqlite::Result<EpisodeOverride> {
        let season: u32 = row.get("season")?;
        let episode: u32 = row.get("episode")?;
        let scene_season: Option<u32> = row.get("scene_season")?;
        let scene_episode: Option<u32> = row.get("scene_episode")?;

        let scene = match scene_episode {
            Some(e) if e > 0 => Some(SeasonEpisode::new(scene_season.unwrap_or(0), e)),
            _ => None,
        };

        Ok(EpisodeOverride {
            show,
            native: SeasonEpisode::new(season, episode),
            scene,
        })
    }

    fn row_to_absolute_override(
        show: ShowIdentity,
        row: &Row,
    ) -> rusqlite::Result<AbsoluteOverride> {
        let absolute_number: u32 = row.get("absolute_number")?;
        let scene_absolute: Option<u32> = row.get("scene_absolute_number")?;

        Ok(AbsoluteOverride {
            show,
            absolute_number,
            scene_absolute: scene_absolute.filter(|a| *a > 0),
        })
    }
}

// ---------------------------------------------------------------------
// SQLite Implementation
// ---------------------------------------------------------------------
impl OverrideRepository for SqliteOverrideRepository {
    fn find_episode_override(
        &self,
        show: &ShowIdentity,
        native: SeasonEpisode,
    ) -> AppResult<Option<EpisodeOverride>> {
        let conn = self.pool.get()?;
        let record = conn
            .query_row(
                "SELECT season, episode, scene_season, scene_episode
                 FROM scene_numbering
                 WHERE indexer = ?1 AND indexer_id = ?2 AND season = ?3 AND episode = ?4
                   AND scene_episode > 0",
                params![show.provider.id(), show.sql_id(), native.season, native.episode],
                |row| Self::row_to_episode_override(*show, row),
            )
            .optional()?;

        Ok(record)
    }

    fn find_absolute_override(
        &self,
        show: &ShowIdentity,
        absolute_number: u32,
    ) -> AppResult<Option<AbsoluteOverride>> {
        let conn = self.pool.get()?;
        let record = conn
            .query_row(
                "SELECT absolute_number, scene_absolute_number
                 FROM scene_numbering
                 WHERE indexer = ?1 AND indexer_id = ?2 AND absolute_number = ?3
                   AND scene_absolute_number > 0",
                params![show.provider.id(), show.sql_id(), absolute_number],
                |row| Self::row_to_absolute_override(*show, row),
            )
            .optional()?;

        Ok(record)
    }

    fn find_native_by_scene(
        &self,
        show: &ShowIdentity,
        scene: SeasonEpisode,
    ) -> AppResult<Option<SeasonEpisode>> {
        let conn = self.pool.get()?;
        let native = conn
            .query_row(
                "SELECT season, episode
                 FROM scene_numbering
                 WHERE indexer = ?1 AND indexer_id = ?2
                   AND scene_season = ?3 AND scene_episode = ?4
                   AND season IS NOT NULL
                 ORDER BY season, episode
                 LIMIT 1",
                params![show.provider.id(), show.sql_id(), scene.season, scene.episode],
                |row| Ok(SeasonEpisode::new(row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        Ok(native)
    }

    fn find_absolute_by_scene_absolute(
        &self,
        show: &ShowIdentity,
        scene_absolute: u32,
    ) -> AppResult<Option<u32>> {
        let conn = self.pool.get()?;
        let absolute = conn
            .query_row(
                "SELECT absolute_number
                 FROM scene_numbering
                 WHERE indexer = ?1 AND indexer_id = ?2
                   AND scene_absolute_number = ?3
                   AND absolute_number IS NOT NULL
                 ORDER BY absolute_number
                 LIMIT 1",
                params![show.provider.id(), show.sql_id(), scene_absolute],
                |row| row.get(0),
            )
            .optional()?;

        Ok(absolute)
    }

    fn list_episode_overrides(&self, show: &ShowIdentity) -> AppResult<Vec<EpisodeOverride>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT season, episode, scene_season, scene_episode
             FROM scene_numbering
             WHERE indexer = ?1 AND indexer_id = ?2
               AND season IS NOT NULL AND scene_episode > 0
             ORDER BY season, episode",
        )?;

        let records = stmt
            .query_map(params![show.provider.id(), show.sql_id()], |row| {
                Self::row_to_episode_override(*show, row)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn list_absolute_overrides(&self, show: &ShowIdentity) -> AppResult<Vec<AbsoluteOverride>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT absolute_number, scene_absolute_number
             FROM scene_numbering
             WHERE indexer = ?1 AND indexer_id = ?2
               AND absolute_number IS NOT NULL AND scene_absolute_number > 0
             ORDER BY absolute_number",
        )?;

        let records = stmt
            .query_map(params![show.provider.id(), show.sql_id()], |row| {
                Self::row_to_absolute_override(*show, row)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn save_episode_override(&self, record: &EpisodeOverride) -> AppResult<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT OR IGNORE INTO scene_numbering (indexer, indexer_id, season, episode)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.show.provider.id(),
                record.show.sql_id(),
                record.native.season,
                record.native.episode,
            ],
        )?;

        tx.execute(
            "UPDATE scene_numbering SET scene_season = ?1, scene_episode = ?2
             WHERE indexer = ?3 AND indexer_id = ?4 AND season = ?5 AND episode = ?6",
            params![
                record.scene.map(|s| s.season),
                record.scene.map(|s| s.episode),
                record.show.provider.id(),
                record.show.sql_id(),
                record.native.season,
                record.native.episode,
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn save_absolute_override(&self, record: &AbsoluteOverride) -> AppResult<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT OR IGNORE INTO scene_numbering (indexer, indexer_id, absolute_number)
             VALUES (?1, ?2, ?3)",
            params![
                record.show.provider.id(),
                record.show.sql_id(),
                record.absolute_number,
            ],
        )?;

        tx.execute(
            "UPDATE scene_numbering SET scene_absolute_number = ?1
             WHERE indexer = ?2 AND indexer_id = ?3 AND absolute_number = ?4",
            params![
                record.scene_absolute,
                record.show.provider.id(),
                record.show.sql_id(),
                record.absolute_number,
            ],
        )?;

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_memory_pool, initialize_database};
    use crate::domain::ProviderKind;

    fn repo() -> SqliteOverrideRepository {
        let pool = create_memory_pool().unwrap();
        initialize_database(&pool.get().unwrap()).unwrap();
        SqliteOverrideRepository::new(Arc::new(pool))
    }

    fn show() -> ShowIdentity {
        ShowIdentity::new(ProviderKind::TVDB, 79824)
    }

    fn count_rows(repo: &SqliteOverrideRepository) -> i64 {
        repo.pool
            .get()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM scene_numbering", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_episode_override_upsert_and_reverse() {
        let repo = repo();
        let native = SeasonEpisode::new(1, 3);

        repo.save_episode_override(&EpisodeOverride {
            show: show(),
            native,
            scene: Some(SeasonEpisode::new(2, 1)),
        })
        .unwrap();

        let found = repo.find_episode_override(&show(), native).unwrap().unwrap();
        assert_eq!(found.scene, Some(SeasonEpisode::new(2, 1)));

        repo.save_episode_override(&EpisodeOverride {
            show: show(),
            native,
            scene: Some(SeasonEpisode::new(2, 2)),
        })
        .unwrap();

        assert_eq!(count_rows(&repo), 1, "upsert must not duplicate the row");
        assert_eq!(
            repo.find_native_by_scene(&show(), SeasonEpisode::new(2, 2)).unwrap(),
            Some(native)
        );
        assert_eq!(
            repo.find_native_by_scene(&show(), SeasonEpisode::new(2, 1)).unwrap(),
            None
        );
    }

    #[test]
    fn test_cleared_override_is_not_returned() {
        let repo = repo();
        let native = SeasonEpisode::new(1, 3);

        repo.save_episode_override(&EpisodeOverride {
            show: show(),
            native,
            scene: Some(SeasonEpisode::new(2, 1)),
        })
        .unwrap();
        repo.save_episode_override(&EpisodeOverride {
            show: show(),
            native,
            scene: None,
        })
        .unwrap();

        assert!(repo.find_episode_override(&show(), native).unwrap().is_none());
        assert!(repo.list_episode_overrides(&show()).unwrap().is_empty());
    }

    #[test]
    fn test_absolute_and_episode_rows_are_independent() {
        let repo = repo();

        repo.save_episode_override(&EpisodeOverride {
            show: show(),
            native: SeasonEpisode::new(1, 1),
            scene: Some(SeasonEpisode::new(1, 2)),
        })
        .unwrap();
        repo.save_absolute_override(&AbsoluteOverride {
            show: show(),
            absolute_number: 1,
            scene_absolute: Some(5),
        })
        .unwrap();

        assert_eq!(count_rows(&repo), 2);

        repo.save_absolute_override(&AbsoluteOverride {
            show: show(),
            absolute_number: 1,
            scene_absolute: None,
        })
        .unwrap();

        assert!(repo.find_absolute_override(&show(), 1).unwrap().is_none());
        assert!(repo
            .find_episode_override(&show(), SeasonEpisode::new(1, 1))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_lists_are_ordered_and_scoped_to_show() {
        let repo = repo();
        let other = ShowIdentity::new(ProviderKind::TVRAGE, 79824);

        for (s, e) in [(2, 1), (1, 10), (1, 2)] {
            repo.save_episode_override(&EpisodeOverride {
                show: show(),
                native: SeasonEpisode::new(s, e),
                scene: Some(SeasonEpisode::new(s + 1, e)),
            })
            .unwrap();
        }
        repo.save_episode_override(&EpisodeOverride {
            show: other,
            native: SeasonEpisode::new(1, 1),
            scene: Some(SeasonEpisode::new(1, 1)),
        })
        .unwrap();
        for (a, sa) in [(12, 10), (3, 1)] {
            repo.save_absolute_override(&AbsoluteOverride {
                show: show(),
                absolute_number: a,
                scene_absolute: Some(sa),
            })
            .unwrap();
        }

        let natives: Vec<SeasonEpisode> = repo
            .list_episode_overrides(&show())
            .unwrap()
            .into_iter()
            .map(|o| o.native)
            .collect();
        assert_eq!(
            natives,
            vec![
                SeasonEpisode::new(1, 2),
                SeasonEpisode::new(1, 10),
                SeasonEpisode::new(2, 1)
            ]
        );

        let absolutes: Vec<u32> = repo
            .list_absolute_overrides(&show())
            .unwrap()
            .into_iter()
            .map(|o| o.absolute_number)
            .collect();
        assert_eq!(absolutes, vec![3, 12]);
        assert_eq!(repo.find_absolute_by_scene_absolute(&show(), 10).unwrap(), Some(12));
    }
}
