// src/application/state.rs

use log::info;
use std::sync::Arc;

use crate::config::NumberingConfig;
use crate::db::{create_connection_pool, initialize_database, ConnectionPool};
use crate::error::AppResult;
use crate::events::{EventBus, ProviderMappingUnavailable, SceneOverrideChanged};
use crate::integrations::{MappingClient, XemClient};
use crate::providers::{ProviderRegistry, StaticProviderRegistry};
use crate::repositories::{
    CatalogRepository, OverrideRepository, RefreshRepository, SqliteCatalogRepository,
    SqliteOverrideRepository, SqliteRefreshRepository,
};
use crate::services::{
    Clock, RefreshTracker, RepairService, ResolutionService, SyncService, SystemClock,
};

/// Everything a host needs to resolve scene numbering.
/// All fields are Arc-wrapped for thread-safe sharing.
pub struct NumberingState {
    pub event_bus: Arc<EventBus>,
    pub registry: Arc<StaticProviderRegistry>,
    pub sync_service: Arc<SyncService>,
    pub resolution_service: Arc<ResolutionService>,
    pub repair_service: Arc<RepairService>,
}

impl NumberingState {
    /// Open the configured database and wire the live XEM client
    pub fn bootstrap(config: &NumberingConfig) -> AppResult<Self> {
        let pool = Arc::new(create_connection_pool(config)?);
        let client: Arc<dyn MappingClient> =
            Arc::new(XemClient::with_base_url(&config.mapping_base_url)?);
        Self::assemble(config, pool, client)
    }

    /// Wire services over an existing pool and mapping client
    pub fn assemble(
        config: &NumberingConfig,
        pool: Arc<ConnectionPool>,
        client: Arc<dyn MappingClient>,
    ) -> AppResult<Self> {
        // 1. INFRASTRUCTURE
        let event_bus = Arc::new(EventBus::new());

        // Initialize schema (idempotent)
        {
            let conn = pool.get()?;
            initialize_database(&conn)?;
        }

        // 2. REPOSITORIES
        let catalog_repo: Arc<dyn CatalogRepository> =
            Arc::new(SqliteCatalogRepository::new(pool.clone()));
        let override_repo: Arc<dyn OverrideRepository> =
            Arc::new(SqliteOverrideRepository::new(pool.clone()));
        let refresh_repo: Arc<dyn RefreshRepository> =
            Arc::new(SqliteRefreshRepository::new(pool.clone()));

        // 3. SERVICES
        let registry = Arc::new(StaticProviderRegistry::from_config(config));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let tracker = RefreshTracker::with_ttl(refresh_repo, clock, config.refresh_ttl_secs);

        let sync_service = Arc::new(
            SyncService::new(
                registry.clone() as Arc<dyn ProviderRegistry>,
                client,
                catalog_repo.clone(),
                tracker,
                event_bus.clone(),
            )
            .with_fetch_timeout(config.fetch_timeout()),
        );
        let resolution_service = Arc::new(ResolutionService::new(
            override_repo,
            catalog_repo.clone(),
            sync_service.clone(),
            event_bus.clone(),
        ));
        let repair_service = Arc::new(RepairService::new(catalog_repo, event_bus.clone()));

        // 4. EVENT HANDLER REGISTRATION
        event_bus.subscribe::<SceneOverrideChanged, _>(|event| {
            info!(
                "Scene override {} for show {} {}",
                if event.cleared { "cleared" } else { "set" },
                event.show,
                event.target
            );
        });
        event_bus.subscribe::<ProviderMappingUnavailable, _>(|event| {
            info!(
                "Show {} keeps cached scene numbering until the next refresh window",
                event.show
            );
        });

        Ok(Self {
            event_bus,
            registry,
            sync_service,
            resolution_service,
            repair_service,
        })
    }
}
