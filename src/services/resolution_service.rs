// src/services/resolution_service.rs
//
// Scene Numbering Resolution
//
// Three layers, highest precedence first:
//   1. Local overrides (user set)
//   2. Provider mapping (catalog scene fields, synced on demand)
//   3. Identity (the input itself)
//
// CRITICAL RULES:
// - Lookups never fail; every failure degrades to the next layer
// - A show flagged as not scene-numbered resolves forward to identity
// - Incomplete input is returned unchanged
// - Zero is never returned as a mapped value
// - Overrides are only written through set_override

use log::warn;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{
    validate_override_request, AbsoluteOverride, EpisodeOverride, SeasonEpisode,
    SetOverrideRequest, ShowIdentity,
};
use crate::error::AppResult;
use crate::events::{EventBus, SceneOverrideChanged};
use crate::repositories::{CatalogRepository, OverrideRepository};
use crate::services::sync_service::SyncService;

/// Full native -> scene maps of one show, one per layer.
///
/// The two views are independent; neither is merged into the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionMap {
    pub overrides: BTreeMap<SeasonEpisode, SeasonEpisode>,
    pub provider: BTreeMap<SeasonEpisode, SeasonEpisode>,
}

/// Full native absolute -> scene absolute maps of one show, one per layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbsoluteMap {
    pub overrides: BTreeMap<u32, u32>,
    pub provider: BTreeMap<u32, u32>,
}

pub struct ResolutionService {
    overrides: Arc<dyn OverrideRepository>,
    catalog: Arc<dyn CatalogRepository>,
    sync: Arc<SyncService>,
    event_bus: Arc<EventBus>,
}

impl ResolutionService {
    pub fn new(
        overrides: Arc<dyn OverrideRepository>,
        catalog: Arc<dyn CatalogRepository>,
        sync: Arc<SyncService>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            overrides,
            catalog,
            sync,
            event_bus,
        }
    }

    // ========================================================================
    // FORWARD: native -> scene
    // ========================================================================

    /// Scene (season, episode) for a native episode.
    ///
    /// With `fallback` the provider mapping is consulted (and synced if
    /// stale) when no override exists.
    pub fn get_scene_numbering(
        &self,
        show: &ShowIdentity,
        native: SeasonEpisode,
        fallback: bool,
    ) -> SeasonEpisode {
        if !show.is_complete() || !native.is_complete() || self.is_not_scene(show) {
            return native;
        }

        if let Some(scene) = self.find_scene_numbering(show, native) {
            return scene;
        }

        if fallback {
            if let Some(scene) = self.find_provider_numbering(show, native) {
                return scene;
            }
        }

        native
    }

    /// Scene absolute number for a native absolute number
    pub fn get_scene_absolute_numbering(
        &self,
        show: &ShowIdentity,
        absolute_number: u32,
        fallback: bool,
    ) -> u32 {
        if !show.is_complete() || absolute_number == 0 || self.is_not_scene(show) {
            return absolute_number;
        }

        if let Some(scene) = self.find_scene_absolute_numbering(show, absolute_number) {
            return scene;
        }

        if fallback {
            if let Some(scene) = self.find_provider_absolute_numbering(show, absolute_number) {
                return scene;
            }
        }

        absolute_number
    }

    /// Override layer only
    pub fn find_scene_numbering(
        &self,
        show: &ShowIdentity,
        native: SeasonEpisode,
    ) -> Option<SeasonEpisode> {
        if !show.is_complete() || !native.is_complete() {
            return None;
        }

        self.overrides
            .find_episode_override(show, native)
            .unwrap_or_else(|e| {
                warn!("Override lookup failed for {} {}: {}", show, native, e);
                None
            })
            .and_then(|record| record.scene)
    }

    /// Override layer only
    pub fn find_scene_absolute_numbering(
        &self,
        show: &ShowIdentity,
        absolute_number: u32,
    ) -> Option<u32> {
        if !show.is_complete() || absolute_number == 0 {
            return None;
        }

        self.overrides
            .find_absolute_override(show, absolute_number)
            .unwrap_or_else(|e| {
                warn!(
                    "Override lookup failed for {} absolute {}: {}",
                    show, absolute_number, e
                );
                None
            })
            .and_then(|record| record.scene_absolute)
    }

    /// Provider layer only. Syncs the show first if its mapping is stale.
    pub fn find_provider_numbering(
        &self,
        show: &ShowIdentity,
        native: SeasonEpisode,
    ) -> Option<SeasonEpisode> {
        if !show.is_complete() || !native.is_complete() {
            return None;
        }

        self.sync_quietly(show);

        self.read_catalog(show, || self.catalog.get_episode(show, native))
            .and_then(|episode| episode.scene_numbering())
    }

    /// Provider layer only. Syncs the show first if its mapping is stale.
    pub fn find_provider_absolute_numbering(
        &self,
        show: &ShowIdentity,
        absolute_number: u32,
    ) -> Option<u32> {
        if !show.is_complete() || absolute_number == 0 {
            return None;
        }

        self.sync_quietly(show);

        self.read_catalog(show, || self.catalog.find_by_absolute(show, absolute_number))
            .and_then(|episode| episode.scene_absolute_number)
    }

    // ========================================================================
    // REVERSE: scene -> native
    // ========================================================================

    /// Native (season, episode) for a scene episode
    pub fn get_native_numbering(
        &self,
        show: &ShowIdentity,
        scene: SeasonEpisode,
        fallback: bool,
    ) -> SeasonEpisode {
        if !show.is_complete() || !scene.is_complete() {
            return scene;
        }

        let by_override = self
            .overrides
            .find_native_by_scene(show, scene)
            .unwrap_or_else(|e| {
                warn!("Override reverse lookup failed for {} {}: {}", show, scene, e);
                None
            });
        if let Some(native) = by_override {
            return native;
        }

        if fallback {
            self.sync_quietly(show);
            if let Some(episode) = self.read_catalog(show, || self.catalog.find_by_scene(show, scene))
            {
                return episode.native();
            }
        }

        scene
    }

    /// Native absolute number for a scene absolute number.
    ///
    /// `season` narrows the provider-layer search to one native season.
    /// Absolute overrides carry no season, so it does not apply to them.
    pub fn get_native_absolute_numbering(
        &self,
        show: &ShowIdentity,
        scene_absolute: u32,
        fallback: bool,
        season: Option<u32>,
    ) -> u32 {
        if !show.is_complete() || scene_absolute == 0 {
            return scene_absolute;
        }

        let by_override = self
            .overrides
            .find_absolute_by_scene_absolute(show, scene_absolute)
            .unwrap_or_else(|e| {
                warn!(
                    "Override reverse lookup failed for {} absolute {}: {}",
                    show, scene_absolute, e
                );
                None
            });
        if let Some(absolute_number) = by_override {
            return absolute_number;
        }

        if fallback {
            self.sync_quietly(show);
            let found = self.read_catalog(show, || {
                self.catalog.find_by_scene_absolute(show, scene_absolute, season)
            });
            if let Some(absolute_number) = found.and_then(|episode| episode.absolute_number) {
                return absolute_number;
            }
        }

        scene_absolute
    }

    // ========================================================================
    // BULK
    // ========================================================================

    /// Every mapped episode of a show, per layer, in native order
    pub fn resolution_map_for_show(&self, show: &ShowIdentity) -> ResolutionMap {
        let mut map = ResolutionMap::default();
        if !show.is_complete() {
            return map;
        }

        let records = self.overrides.list_episode_overrides(show).unwrap_or_else(|e| {
            warn!("Listing overrides failed for {}: {}", show, e);
            Vec::new()
        });
        map.overrides = records
            .into_iter()
            .filter_map(|EpisodeOverride { native, scene, .. }| scene.map(|scene| (native, scene)))
            .collect();

        self.sync_quietly(show);
        if let Some(episodes) = self.read_catalog(show, || self.catalog.get_episodes(show).map(Some)) {
            map.provider = episodes
                .iter()
                .filter_map(|episode| {
                    episode
                        .scene_numbering()
                        .map(|scene| (episode.native(), scene))
                })
                .collect();
        }

        map
    }

    /// Every mapped absolute number of a show, per layer, in absolute order
    pub fn absolute_map_for_show(&self, show: &ShowIdentity) -> AbsoluteMap {
        let mut map = AbsoluteMap::default();
        if !show.is_complete() {
            return map;
        }

        let records = self.overrides.list_absolute_overrides(show).unwrap_or_else(|e| {
            warn!("Listing absolute overrides failed for {}: {}", show, e);
            Vec::new()
        });
        map.overrides = records
            .into_iter()
            .filter_map(
                |AbsoluteOverride {
                     absolute_number,
                     scene_absolute,
                     ..
                 }| scene_absolute.map(|scene| (absolute_number, scene)),
            )
            .collect();

        self.sync_quietly(show);
        if let Some(episodes) = self.read_catalog(show, || self.catalog.get_episodes(show).map(Some)) {
            // Several rows may share an absolute number; the first in native order wins
            for episode in &episodes {
                if let (Some(absolute), Some(scene)) =
                    (episode.absolute_number, episode.scene_absolute_number)
                {
                    map.provider.entry(absolute).or_insert(scene);
                }
            }
        }

        map
    }

    // ========================================================================
    // WRITE PATH
    // ========================================================================

    /// Set or clear one local override.
    ///
    /// Episode-keyed and absolute-keyed overrides are separate records;
    /// writing one never touches the other.
    pub fn set_override(&self, show: &ShowIdentity, request: SetOverrideRequest) -> AppResult<()> {
        validate_override_request(show, &request)?;

        let cleared = request.is_clear();
        let target = match request {
            SetOverrideRequest::Episode { native, scene } => {
                self.overrides.save_episode_override(&EpisodeOverride {
                    show: *show,
                    native,
                    scene,
                })?;
                native.to_string()
            }
            SetOverrideRequest::Absolute {
                absolute_number,
                scene_absolute,
            } => {
                self.overrides.save_absolute_override(&AbsoluteOverride {
                    show: *show,
                    absolute_number,
                    scene_absolute,
                })?;
                format!("absolute {}", absolute_number)
            }
        };

        self.event_bus
            .emit(SceneOverrideChanged::new(*show, target, cleared));
        Ok(())
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    /// True only for a show the catalog knows and flags as not scene-numbered
    fn is_not_scene(&self, show: &ShowIdentity) -> bool {
        match self.catalog.is_scene_numbered(show) {
            Ok(Some(is_scene)) => !is_scene,
            Ok(None) => false,
            Err(e) => {
                warn!("Could not read scene flag for {}: {}", show, e);
                false
            }
        }
    }

    fn sync_quietly(&self, show: &ShowIdentity) {
        if let Err(e) = self.sync.ensure_fresh(show, false) {
            warn!("Scene mapping sync failed for {}: {}", show, e);
        }
    }

    fn read_catalog<T, F>(&self, show: &ShowIdentity, read: F) -> Option<T>
    where
        F: FnOnce() -> AppResult<Option<T>>,
    {
        read().unwrap_or_else(|e| {
            warn!("Catalog read failed for {}, using no mapping: {}", show, e);
            None
        })
    }
}
