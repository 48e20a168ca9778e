// src/services/sync_service_tests.rs
//
// Provider mapping sync tests
//
// INVARIANTS TESTED:
// - At most one fetch per show inside the TTL window
// - The attempt is recorded even when the remote fails
// - Merging an unchanged document changes nothing
// - Ineligible shows never reach the remote
// - Concurrent syncs of one show fetch once

#[cfg(test)]
mod sync_tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use crate::domain::{ProviderKind, RefreshState, SeasonEpisode, ShowIdentity, DEFAULT_REFRESH_TTL_SECS};
    use crate::error::AppError;
    use crate::integrations::MockMappingClient;
    use crate::repositories::{CatalogRepository, RefreshRepository};
    use crate::services::test_support::*;
    use crate::services::SyncOutcome;

    fn seeded(client: MockMappingClient) -> Harness {
        let harness = Harness::new(client);
        harness.seed_show(
            &enrolled_show(),
            true,
            &[(1, 1, 1), (1, 2, 2), (1, 3, 3), (2, 1, 4)],
        );
        harness
    }

    fn standard_document() -> crate::integrations::MappingDocument {
        success_document(&[
            ((1, 1), (1, 1, 1)),
            ((1, 2), (1, 2, 2)),
            ((1, 3), (2, 1, 3)),
            ((2, 1), (2, 2, 4)),
        ])
    }

    // ========================================================================
    // THROTTLING
    // ========================================================================

    #[test]
    fn test_one_fetch_inside_ttl() {
        let mut client = MockMappingClient::new();
        client
            .expect_fetch_mapping_document()
            .withf(|show_id, origin, _| *show_id == ENROLLED_SHOW_ID && origin.to_string() == "tvdb")
            .times(1)
            .returning(|_, _, _| Ok(standard_document()));

        let harness = seeded(client);
        let show = enrolled_show();

        let first = harness.sync.ensure_fresh(&show, false).unwrap();
        assert!(matches!(first, SyncOutcome::Merged { .. }));

        harness.clock.advance(DEFAULT_REFRESH_TTL_SECS);
        let second = harness.sync.ensure_fresh(&show, false).unwrap();
        assert_eq!(second, SyncOutcome::UpToDate);
    }

    #[test]
    fn test_refetch_after_ttl_expires() {
        let mut client = MockMappingClient::new();
        client
            .expect_fetch_mapping_document()
            .times(2)
            .returning(|_, _, _| Ok(standard_document()));

        let harness = seeded(client);
        let show = enrolled_show();

        harness.sync.ensure_fresh(&show, false).unwrap();
        harness.clock.advance(DEFAULT_REFRESH_TTL_SECS + 1);
        let outcome = harness.sync.ensure_fresh(&show, false).unwrap();

        assert_eq!(outcome, SyncOutcome::Merged { writes: 0 });
        let state = harness.refresh.get(&show).unwrap().unwrap();
        assert_eq!(state.last_refreshed, START_TIME + DEFAULT_REFRESH_TTL_SECS + 1);
    }

    #[test]
    fn test_forced_refresh_ignores_ttl() {
        let mut client = MockMappingClient::new();
        client
            .expect_fetch_mapping_document()
            .times(2)
            .returning(|_, _, _| Ok(standard_document()));

        let harness = seeded(client);
        let show = enrolled_show();

        harness.sync.ensure_fresh(&show, false).unwrap();
        let outcome = harness.sync.refresh_show(&show).unwrap();

        assert_eq!(outcome, SyncOutcome::Merged { writes: 0 });
    }

    // ========================================================================
    // MERGE
    // ========================================================================

    #[test]
    fn test_merge_writes_scene_fields_by_native_key() {
        let mut client = MockMappingClient::new();
        client
            .expect_fetch_mapping_document()
            .returning(|_, _, _| Ok(standard_document()));

        let harness = seeded(client);
        let show = enrolled_show();

        let outcome = harness.sync.ensure_fresh(&show, false).unwrap();
        // every scene field of all four episodes was unset
        assert_eq!(outcome, SyncOutcome::Merged { writes: 12 });

        let episode = harness
            .catalog
            .get_episode(&show, SeasonEpisode::new(1, 3))
            .unwrap()
            .unwrap();
        assert_eq!(episode.scene_numbering(), Some(SeasonEpisode::new(2, 1)));
        assert_eq!(episode.scene_absolute_number, Some(3));
        assert_eq!(episode.absolute_number, Some(3));

        assert!(harness
            .event_types()
            .contains(&"ProviderMappingRefreshed".to_string()));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut client = MockMappingClient::new();
        client
            .expect_fetch_mapping_document()
            .returning(|_, _, _| Ok(standard_document()));

        let harness = seeded(client);
        let show = enrolled_show();

        harness.sync.refresh_show(&show).unwrap();
        let before = harness.catalog.get_episodes(&show).unwrap();

        let outcome = harness.sync.refresh_show(&show).unwrap();
        let after = harness.catalog.get_episodes(&show).unwrap();

        assert_eq!(outcome, SyncOutcome::Merged { writes: 0 });
        assert_eq!(before, after);
    }

    #[test]
    fn test_double_episode_second_scene_wins() {
        let mut client = MockMappingClient::new();
        client.expect_fetch_mapping_document().returning(|_, _, _| {
            Ok(document(serde_json::json!({
                "result": "success",
                "data": [{
                    "tvdb": { "season": 1, "episode": 1, "absolute": 1 },
                    "scene": { "season": 1, "episode": 1, "absolute": 1 },
                    "scene_2": { "season": 1, "episode": 2, "absolute": 2 }
                }]
            })))
        });

        let harness = seeded(client);
        let show = enrolled_show();
        harness.sync.ensure_fresh(&show, false).unwrap();

        let episode = harness
            .catalog
            .get_episode(&show, SeasonEpisode::new(1, 1))
            .unwrap()
            .unwrap();
        assert_eq!(episode.scene_numbering(), Some(SeasonEpisode::new(1, 2)));
        assert_eq!(episode.scene_absolute_number, Some(2));
    }

    #[test]
    fn test_mapping_for_unknown_episode_creates_nothing() {
        let mut client = MockMappingClient::new();
        client
            .expect_fetch_mapping_document()
            .returning(|_, _, _| Ok(success_document(&[((9, 9), (9, 9, 99))])));

        let harness = seeded(client);
        let show = enrolled_show();

        let outcome = harness.sync.ensure_fresh(&show, false).unwrap();

        assert_eq!(outcome, SyncOutcome::Merged { writes: 0 });
        assert_eq!(harness.catalog.get_episodes(&show).unwrap().len(), 4);
    }

    // ========================================================================
    // FAILURES
    // ========================================================================

    #[test]
    fn test_remote_failure_is_recorded_and_not_propagated() {
        let mut client = MockMappingClient::new();
        client
            .expect_fetch_mapping_document()
            .times(1)
            .returning(|_, _, _| Err(AppError::RemoteUnavailable("timed out".to_string())));

        let harness = seeded(client);
        let show = enrolled_show();

        let outcome = harness.sync.ensure_fresh(&show, false).unwrap();
        assert_eq!(outcome, SyncOutcome::RemoteUnavailable);

        assert_eq!(
            harness.refresh.get(&show).unwrap(),
            Some(RefreshState::new(show, START_TIME))
        );
        assert_eq!(
            harness.sync.ensure_fresh(&show, false).unwrap(),
            SyncOutcome::UpToDate
        );
        assert_eq!(harness.event_types(), vec!["ProviderMappingUnavailable"]);
    }

    #[test]
    fn test_unsuccessful_or_empty_document_is_no_mapping() {
        let mut client = MockMappingClient::new();
        let mut answers = vec![
            document(serde_json::json!({ "result": "failure", "data": {}, "message": "no show with the tvdb_id 79824 found" })),
            document(serde_json::json!({ "result": "success", "data": [] })),
        ]
        .into_iter();
        client
            .expect_fetch_mapping_document()
            .times(2)
            .returning(move |_, _, _| Ok(answers.next().unwrap_or_default()));

        let harness = seeded(client);
        let show = enrolled_show();

        assert_eq!(harness.sync.refresh_show(&show).unwrap(), SyncOutcome::NoMapping);
        assert_eq!(harness.sync.refresh_show(&show).unwrap(), SyncOutcome::NoMapping);

        let episodes = harness.catalog.get_episodes(&show).unwrap();
        assert!(episodes.iter().all(|e| e.scene_numbering().is_none()));
    }

    #[test]
    fn test_catalog_failure_surfaces_from_sync() {
        let mut client = MockMappingClient::new();
        client
            .expect_fetch_mapping_document()
            .returning(|_, _, _| Ok(standard_document()));

        let harness = seeded(client);
        harness.drop_catalog();

        let result = harness.sync.ensure_fresh(&enrolled_show(), false);
        assert!(matches!(result, Err(AppError::CatalogRead(_))));
    }

    // ========================================================================
    // ELIGIBILITY
    // ========================================================================

    #[test]
    fn test_not_enrolled_show_never_fetches() {
        let harness = Harness::offline();
        let show = local_show();

        assert_eq!(
            harness.sync.ensure_fresh(&show, true).unwrap(),
            SyncOutcome::NotEligible
        );
        assert!(harness.refresh.get(&show).unwrap().is_none());
    }

    #[test]
    fn test_provider_without_scene_origin_never_fetches() {
        let harness = Harness::offline();
        let show = ShowIdentity::new(ProviderKind::TVRAGE, ENROLLED_SHOW_ID);

        assert_eq!(
            harness.sync.ensure_fresh(&show, false).unwrap(),
            SyncOutcome::NotEligible
        );
    }

    #[test]
    fn test_incomplete_show_never_fetches() {
        let harness = Harness::offline();
        let show = ShowIdentity::new(ProviderKind::TVDB, 0);

        assert_eq!(
            harness.sync.ensure_fresh(&show, true).unwrap(),
            SyncOutcome::NotEligible
        );
    }

    // ========================================================================
    // CONCURRENCY
    // ========================================================================

    #[test]
    fn test_concurrent_syncs_of_one_show_fetch_once() {
        let mut client = MockMappingClient::new();
        client
            .expect_fetch_mapping_document()
            .times(1)
            .returning(|_, _, _| {
                thread::sleep(Duration::from_millis(100));
                Ok(standard_document())
            });

        let harness = seeded(client);

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let sync = Arc::clone(&harness.sync);
                thread::spawn(move || sync.ensure_fresh(&enrolled_show(), false).unwrap())
            })
            .collect();

        let mut outcomes: Vec<SyncOutcome> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();
        outcomes.sort_by_key(|outcome| matches!(outcome, SyncOutcome::UpToDate));

        assert!(matches!(outcomes[0], SyncOutcome::Merged { .. }));
        assert_eq!(outcomes[1], SyncOutcome::UpToDate);
    }
}
