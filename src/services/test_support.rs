// src/services/test_support.rs
//
// Shared wiring for service tests: one in-memory database, real SQLite
// repositories, a fixed clock and a mocked mapping client.

use std::sync::{Arc, Mutex};

use crate::db::{create_memory_pool, initialize_database, ConnectionPool};
use crate::domain::{CatalogEpisode, ProviderKind, ShowIdentity};
use crate::events::{
    DomainEvent, EventBus, ProviderMappingRefreshed, ProviderMappingUnavailable,
    ProviderNumberingRepaired, SceneOverrideChanged,
};
use crate::integrations::{MappingDocument, MockMappingClient};
use crate::providers::StaticProviderRegistry;
use crate::config::ProviderSettings;
use crate::repositories::{SqliteCatalogRepository, SqliteOverrideRepository, SqliteRefreshRepository};
use crate::services::{
    FixedClock, RefreshTracker, RepairService, ResolutionService, SyncService,
};

/// Enrolled for provider mapping sync
pub const ENROLLED_SHOW_ID: u64 = 79824;
/// Known to the registry's provider, but not enrolled
pub const LOCAL_SHOW_ID: u64 = 81189;

pub const START_TIME: i64 = 1_700_000_000;

pub fn enrolled_show() -> ShowIdentity {
    ShowIdentity::new(ProviderKind::TVDB, ENROLLED_SHOW_ID)
}

pub fn local_show() -> ShowIdentity {
    ShowIdentity::new(ProviderKind::TVDB, LOCAL_SHOW_ID)
}

pub struct Harness {
    pub pool: Arc<ConnectionPool>,
    pub catalog: Arc<SqliteCatalogRepository>,
    pub refresh: Arc<SqliteRefreshRepository>,
    pub clock: Arc<FixedClock>,
    pub event_bus: Arc<EventBus>,
    pub emitted: Arc<Mutex<Vec<String>>>,
    pub sync: Arc<SyncService>,
    pub resolution: ResolutionService,
    pub repair: RepairService,
}

impl Harness {
    pub fn new(client: MockMappingClient) -> Self {
        let pool = create_memory_pool().unwrap();
        initialize_database(&pool.get().unwrap()).unwrap();
        let pool = Arc::new(pool);

        let catalog = Arc::new(SqliteCatalogRepository::new(Arc::clone(&pool)));
        let overrides = Arc::new(SqliteOverrideRepository::new(Arc::clone(&pool)));
        let refresh = Arc::new(SqliteRefreshRepository::new(Arc::clone(&pool)));

        let registry = Arc::new(StaticProviderRegistry::new(vec![
            ProviderSettings {
                kind: ProviderKind::TVDB,
                name: "TheTVDB".to_string(),
                scene_origin: Some("tvdb".to_string()),
            },
            ProviderSettings {
                kind: ProviderKind::TVRAGE,
                name: "TVRage".to_string(),
                scene_origin: None,
            },
        ]));
        registry.enroll(ProviderKind::TVDB, [ENROLLED_SHOW_ID]);
        registry.enroll(ProviderKind::TVRAGE, [ENROLLED_SHOW_ID]);

        let clock = Arc::new(FixedClock::new(START_TIME));
        let event_bus = Arc::new(EventBus::new());
        let emitted = Arc::new(Mutex::new(Vec::new()));
        record::<SceneOverrideChanged>(&event_bus, &emitted);
        record::<ProviderMappingRefreshed>(&event_bus, &emitted);
        record::<ProviderMappingUnavailable>(&event_bus, &emitted);
        record::<ProviderNumberingRepaired>(&event_bus, &emitted);

        let tracker = RefreshTracker::new(refresh.clone(), clock.clone());
        let sync = Arc::new(SyncService::new(
            registry,
            Arc::new(client),
            catalog.clone(),
            tracker,
            Arc::clone(&event_bus),
        ));

        let resolution = ResolutionService::new(
            overrides,
            catalog.clone(),
            Arc::clone(&sync),
            Arc::clone(&event_bus),
        );
        let repair = RepairService::new(catalog.clone(), Arc::clone(&event_bus));

        Self {
            pool,
            catalog,
            refresh,
            clock,
            event_bus,
            emitted,
            sync,
            resolution,
            repair,
        }
    }

    /// Harness whose mapping client must never be called
    pub fn offline() -> Self {
        Self::new(MockMappingClient::new())
    }

    /// Register a show and plain episodes `(season, episode, absolute)`.
    /// An absolute of 0 leaves the field unset.
    pub fn seed_show(&self, show: &ShowIdentity, is_scene: bool, episodes: &[(u32, u32, u32)]) {
        self.catalog.save_show(show, "Test Show", is_scene).unwrap();
        for &(season, episode, absolute) in episodes {
            let mut row = CatalogEpisode::new(*show, season, episode);
            row.absolute_number = Some(absolute).filter(|n| *n != 0);
            self.catalog.save_episode(&row).unwrap();
        }
    }

    pub fn save_episode(&self, episode: &CatalogEpisode) {
        self.catalog.save_episode(episode).unwrap();
    }

    pub fn drop_catalog(&self) {
        self.pool
            .get()
            .unwrap()
            .execute_batch("DROP TABLE tv_episodes;")
            .unwrap();
    }

    pub fn event_types(&self) -> Vec<String> {
        self.emitted.lock().unwrap().clone()
    }
}

fn record<E: DomainEvent + 'static>(bus: &EventBus, sink: &Arc<Mutex<Vec<String>>>) {
    let sink = Arc::clone(sink);
    bus.subscribe::<E, _>(move |event| sink.lock().unwrap().push(event.event_type().to_string()));
}

/// Mapping document from JSON
pub fn document(value: serde_json::Value) -> MappingDocument {
    serde_json::from_value(value).unwrap()
}

/// Successful document mapping tvdb `(season, episode)` to scene
/// `(season, episode, absolute)`
pub fn success_document(entries: &[((u32, u32), (u32, u32, u32))]) -> MappingDocument {
    let data: Vec<serde_json::Value> = entries
        .iter()
        .map(|&((season, episode), (s_season, s_episode, s_absolute))| {
            serde_json::json!({
                "tvdb": { "season": season, "episode": episode, "absolute": 0 },
                "scene": { "season": s_season, "episode": s_episode, "absolute": s_absolute }
            })
        })
        .collect();

    document(serde_json::json!({
        "result": "success",
        "data": data,
        "message": ""
    }))
}
