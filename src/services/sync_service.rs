// src/services/sync_service.rs
//
// Provider Mapping Sync
//
// Pulls the provider's scene mapping document for a show and merges it
// into the catalog's scene fields.
//
// CRITICAL RULES:
// - At most one sync per show per TTL window (attempts count, not successes)
// - The attempt is stamped before the fetch
// - A remote failure is never an error for the caller
// - Writes are keyed by native (season, episode) and applied as one batch
// - Syncs of one show are serialized; different shows never share a lock

use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::DEFAULT_FETCH_TIMEOUT_SECS;
use crate::domain::{
    non_sentinel, CatalogEpisode, EpisodeFieldUpdate, NumberingField, SeasonEpisode, ShowIdentity,
};
use crate::error::AppResult;
use crate::events::{EventBus, ProviderMappingRefreshed, ProviderMappingUnavailable};
use crate::integrations::{MappingClient, SceneMapping};
use crate::providers::ProviderRegistry;
use crate::repositories::CatalogRepository;
use crate::services::refresh_tracker::RefreshTracker;

/// What a call to `ensure_fresh` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Provider has no mapping support, or the show is not enrolled
    NotEligible,
    /// Last attempt is inside the TTL window
    UpToDate,
    /// The service answered but had nothing for this show
    NoMapping,
    /// Fetch failed; the attempt is still recorded
    RemoteUnavailable,
    /// Document merged; `writes` catalog fields actually changed
    Merged { writes: usize },
}

/// Per-show mutual exclusion.
///
/// The outer map lock is only held while looking up a show's lock. Entries
/// nobody holds or waits on are dropped on the next lookup, so the map only
/// tracks shows with a sync in flight.
#[derive(Default)]
pub struct ShowLocks {
    locks: Mutex<HashMap<ShowIdentity, Arc<Mutex<()>>>>,
}

impl ShowLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, show: &ShowIdentity) -> Arc<Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // the map's own reference is the only one left once a sync finishes
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(*show).or_default())
    }

    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

pub struct SyncService {
    registry: Arc<dyn ProviderRegistry>,
    client: Arc<dyn MappingClient>,
    catalog: Arc<dyn CatalogRepository>,
    tracker: RefreshTracker,
    event_bus: Arc<EventBus>,
    fetch_timeout: Duration,
    locks: ShowLocks,
}

impl SyncService {
    pub fn new(
        registry: Arc<dyn ProviderRegistry>,
        client: Arc<dyn MappingClient>,
        catalog: Arc<dyn CatalogRepository>,
        tracker: RefreshTracker,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            registry,
            client,
            catalog,
            tracker,
            event_bus,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            locks: ShowLocks::new(),
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Sync the show's provider mapping if it is stale (or `force` is set).
    ///
    /// Only catalog failures are returned as errors.
    pub fn ensure_fresh(&self, show: &ShowIdentity, force: bool) -> AppResult<SyncOutcome> {
        if !show.is_complete() {
            return Ok(SyncOutcome::NotEligible);
        }

        let origin = match self.registry.scene_origin(show.provider) {
            Some(origin) => origin,
            None => return Ok(SyncOutcome::NotEligible),
        };

        if !self
            .registry
            .is_enrolled_for_mapping(show.provider, show.show_id)
        {
            return Ok(SyncOutcome::NotEligible);
        }

        let lock = self.locks.lock_for(show);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if !force && !self.tracker.is_stale(show)? {
            return Ok(SyncOutcome::UpToDate);
        }

        self.tracker.mark_attempted(show, self.tracker.now())?;

        debug!(
            "Loading scene mapping for show {} on {}",
            show.show_id,
            self.registry.display_name(show.provider)
        );

        let document =
            match self
                .client
                .fetch_mapping_document(show.show_id, &origin, self.fetch_timeout)
            {
                Ok(document) => document,
                Err(e) => {
                    warn!(
                        "Scene mapping unavailable for show {} on {}: {}",
                        show.show_id,
                        self.registry.display_name(show.provider),
                        e
                    );
                    self.event_bus
                        .emit(ProviderMappingUnavailable::new(*show, e.to_string()));
                    return Ok(SyncOutcome::RemoteUnavailable);
                }
            };

        if !document.is_success() {
            info!(
                "No scene mapping for show {} on {}: {}",
                show.show_id,
                self.registry.display_name(show.provider),
                document.message.as_deref().unwrap_or("no message")
            );
            return Ok(SyncOutcome::NoMapping);
        }

        let mappings = document.scene_mappings(&origin);
        if mappings.is_empty() {
            debug!(
                "Scene mapping for show {} on {} is empty",
                show.show_id,
                self.registry.display_name(show.provider)
            );
            return Ok(SyncOutcome::NoMapping);
        }

        let current = self.catalog.get_episodes(show)?;
        let updates = stage_updates(show, &mappings, &current);
        let writes = self.catalog.batch_apply(&updates)?;

        debug!(
            "Merged {} scene mappings for show {} ({} fields changed)",
            mappings.len(),
            show,
            writes
        );

        self.event_bus
            .emit(ProviderMappingRefreshed::new(*show, mappings.len(), force));

        Ok(SyncOutcome::Merged { writes })
    }

    /// Sync regardless of the TTL window
    pub fn refresh_show(&self, show: &ShowIdentity) -> AppResult<SyncOutcome> {
        self.ensure_fresh(show, true)
    }
}

const SCENE_FIELDS: [NumberingField; 3] = [
    NumberingField::SceneSeason,
    NumberingField::SceneEpisode,
    NumberingField::SceneAbsoluteNumber,
];

/// Build the writes that bring `current` in line with `mappings`.
///
/// When several mappings target one native episode (double episodes) the
/// later one wins. Fields already holding the mapped value and episodes the
/// catalog does not know are skipped.
fn stage_updates(
    show: &ShowIdentity,
    mappings: &[SceneMapping],
    current: &[CatalogEpisode],
) -> Vec<EpisodeFieldUpdate> {
    let mut staged: Vec<EpisodeFieldUpdate> = Vec::new();
    let mut slots: HashMap<(SeasonEpisode, NumberingField), usize> = HashMap::new();

    for mapping in mappings {
        let values = [
            mapping.scene.season,
            mapping.scene.episode,
            mapping.scene.absolute,
        ];
        for (field, value) in SCENE_FIELDS.iter().zip(values) {
            let update =
                EpisodeFieldUpdate::new(*show, mapping.origin, *field, non_sentinel(value));
            match slots.get(&(mapping.origin, *field)) {
                Some(&slot) => staged[slot] = update,
                None => {
                    slots.insert((mapping.origin, *field), staged.len());
                    staged.push(update);
                }
            }
        }
    }

    let known: HashMap<SeasonEpisode, &CatalogEpisode> =
        current.iter().map(|episode| (episode.native(), episode)).collect();

    let mut missing: HashSet<SeasonEpisode> = HashSet::new();
    let updates: Vec<EpisodeFieldUpdate> = staged
        .into_iter()
        .filter(|update| match known.get(&update.native) {
            Some(episode) => episode.field(update.field) != update.value,
            None => {
                missing.insert(update.native);
                false
            }
        })
        .collect();

    if !missing.is_empty() {
        debug!(
            "Skipped scene mappings for {} episodes of show {} missing from the catalog",
            missing.len(),
            show
        );
    }

    updates
}
