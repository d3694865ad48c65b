//! Dashboard loading against a scripted service: ordering, isolation,
//! stale results and timeouts

use aether_client::ClientError;
use aether_core::{EnrichmentKind, StoryId};
use aether_orchestrator::{
    select_tab_data, AnalysisError, AnalysisOrchestrator, DashboardTab, Resolution, Slot, TabView,
};
use aether_test_utils::{fixtures, Endpoint, ScriptedApi};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn setup(api: ScriptedApi) -> (Arc<ScriptedApi>, AnalysisOrchestrator) {
    let api = Arc::new(api);
    let orchestrator = AnalysisOrchestrator::new(api.clone());
    (api, orchestrator)
}

#[tokio::test]
async fn failed_primary_issues_no_enrichment_requests() {
    let api = ScriptedApi::new().with_dashboard("S1");
    api.fail(Endpoint::Analysis, "S1", 500);
    let (api, orchestrator) = setup(api);

    let err = orchestrator.load(StoryId::new("S1")).await.unwrap_err();

    assert!(err.is_fatal_to_stage());
    assert!(matches!(
        err,
        AnalysisError::PrimaryFetchFailure {
            source: ClientError::Status { status: 500, .. },
            ..
        }
    ));
    assert_eq!(api.count(Endpoint::Analysis), 1);
    assert_eq!(api.count(Endpoint::Correlations), 0);
    assert_eq!(api.count(Endpoint::Recommendations), 0);

    orchestrator.with_state(|state| {
        for tab in DashboardTab::ALL {
            assert!(matches!(
                select_tab_data(&state.bundle, tab),
                TabView::Failed { .. }
            ));
        }
    });
}

#[tokio::test]
async fn primary_failure_is_recovered_by_manual_retry() {
    let api = ScriptedApi::new().with_dashboard("S1");
    api.fail(Endpoint::Analysis, "S1", 502);
    let (api, orchestrator) = setup(api);
    assert!(orchestrator.load(StoryId::new("S1")).await.is_err());

    api.respond(Endpoint::Analysis, "S1", fixtures::analysis_payload());
    assert_eq!(orchestrator.load_primary().await.unwrap(), Resolution::Applied);
    assert_eq!(api.count(Endpoint::Analysis), 2);

    let report = orchestrator
        .load_enrichments(&EnrichmentKind::AUTOMATIC)
        .await
        .unwrap();
    assert_eq!(report.loaded.len(), 2);
    assert!(report.failed.is_empty());
}

#[tokio::test]
async fn failed_enrichment_leaves_other_tabs_intact() {
    let api = ScriptedApi::new().with_dashboard("S1");
    api.fail(Endpoint::Correlations, "S1", 500);
    let (_api, orchestrator) = setup(api);

    assert_eq!(
        orchestrator.load(StoryId::new("S1")).await.unwrap(),
        Resolution::Applied
    );

    orchestrator.with_state(|state| {
        let TabView::Correlations { heatmap, discovered } =
            select_tab_data(&state.bundle, DashboardTab::Correlations)
        else {
            panic!("expected correlations view");
        };
        assert!(heatmap.is_some());
        assert!(discovered.is_failed());

        assert!(select_tab_data(&state.bundle, DashboardTab::Recommendations).has_content());
        assert!(select_tab_data(&state.bundle, DashboardTab::Insights).has_content());
    });
}

#[tokio::test(start_paused = true)]
async fn late_enrichment_for_previous_story_is_discarded() {
    let api = ScriptedApi::new().with_dashboard("S1").with_dashboard("S2");
    api.delay(Endpoint::Correlations, "S1", Duration::from_secs(10));
    let (api, orchestrator) = setup(api);

    let first = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.load(StoryId::new("S1")).await }
    });

    tokio::time::sleep(Duration::from_secs(1)).await;
    {
        let state = orchestrator.snapshot();
        assert_eq!(state.story_id, Some(StoryId::new("S1")));
        assert!(state.bundle.primary.is_ready());
        assert!(state.bundle.correlations.is_loading());
    }

    orchestrator.load(StoryId::new("S2")).await.unwrap();
    let settled = orchestrator.snapshot();

    assert_eq!(first.await.unwrap().unwrap(), Resolution::Discarded);
    assert!(api.called(Endpoint::Correlations, "S1"));

    let state = orchestrator.snapshot();
    assert_eq!(state.story_id, Some(StoryId::new("S2")));
    assert_eq!(state, settled);
}

#[tokio::test(start_paused = true)]
async fn late_primary_after_deactivation_is_discarded() {
    let api = ScriptedApi::new().with_dashboard("S1");
    api.delay(Endpoint::Analysis, "S1", Duration::from_secs(3));
    let (api, orchestrator) = setup(api);

    let pending = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.load(StoryId::new("S1")).await }
    });
    tokio::time::sleep(Duration::from_secs(1)).await;
    orchestrator.deactivate();

    assert_eq!(pending.await.unwrap().unwrap(), Resolution::Discarded);
    assert_eq!(orchestrator.snapshot().bundle.primary, Slot::Absent);
    assert_eq!(api.count(Endpoint::Correlations), 0);
}

#[tokio::test(start_paused = true)]
async fn hanging_primary_times_out_as_fatal_failure() {
    let api = ScriptedApi::new().with_dashboard("S1");
    api.hang(Endpoint::Analysis, "S1");
    let (api, orchestrator) = setup(api);
    let orchestrator = orchestrator.with_primary_timeout(Some(Duration::from_secs(5)));

    let err = orchestrator.load(StoryId::new("S1")).await.unwrap_err();

    assert!(matches!(
        err,
        AnalysisError::PrimaryFetchFailure {
            source: ClientError::Timeout(5000),
            ..
        }
    ));
    let failure = orchestrator.snapshot().bundle.primary.failure().cloned().unwrap();
    assert!(failure.timed_out);
    assert_eq!(api.count(Endpoint::Correlations), 0);
}

#[tokio::test(start_paused = true)]
async fn hanging_enrichment_times_out_into_empty_slot() {
    let api = ScriptedApi::new().with_dashboard("S1");
    api.hang(Endpoint::Recommendations, "S1");
    let (_api, orchestrator) = setup(api);
    let orchestrator = orchestrator.with_enrichment_timeout(Some(Duration::from_secs(2)));

    assert_eq!(
        orchestrator.load(StoryId::new("S1")).await.unwrap(),
        Resolution::Applied
    );

    let state = orchestrator.snapshot();
    assert!(state.bundle.correlations.is_ready());
    assert!(state.bundle.recommendations.failure().unwrap().timed_out);
    assert!(matches!(
        select_tab_data(&state.bundle, DashboardTab::Recommendations),
        TabView::Unavailable { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn hanging_enrichment_without_timeout_stays_loading() {
    let api = ScriptedApi::new().with_dashboard("S1");
    api.hang(Endpoint::Correlations, "S1");
    let (_api, orchestrator) = setup(api);

    let pending = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.load(StoryId::new("S1")).await }
    });
    tokio::time::sleep(Duration::from_secs(600)).await;

    let state = orchestrator.snapshot();
    assert!(state.bundle.primary.is_ready());
    assert!(state.bundle.recommendations.is_ready());
    assert!(state.bundle.correlations.is_loading());

    pending.abort();
}

#[tokio::test(start_paused = true)]
async fn discovery_applies_only_after_both_settle() {
    let api = ScriptedApi::new().with_dashboard("S1");
    api.delay(Endpoint::Anomalies, "S1", Duration::from_secs(4));
    let (api, orchestrator) = setup(api);
    orchestrator.load(StoryId::new("S1")).await.unwrap();

    let discovery = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.trigger_discovery().await }
    });
    tokio::time::sleep(Duration::from_secs(1)).await;
    {
        let state = orchestrator.snapshot();
        assert!(state.bundle.clusters.is_loading());
        assert!(state.bundle.anomalies.is_loading());
    }

    assert_eq!(discovery.await.unwrap().unwrap(), Resolution::Applied);
    orchestrator.with_state(|state| {
        let TabView::Ml { clusters, anomalies } = select_tab_data(&state.bundle, DashboardTab::Ml)
        else {
            panic!("expected ml view");
        };
        assert_eq!(clusters.value().map(|c| c.clusters.len()), Some(2));
        assert_eq!(anomalies.value().map(|a| a.anomaly_count), Some(7));
    });

    for tab in DashboardTab::ALL {
        orchestrator.with_state(|state| {
            let _ = select_tab_data(&state.bundle, tab);
        });
    }
    assert_eq!(api.count(Endpoint::Clusters), 1);
    assert_eq!(api.count(Endpoint::Anomalies), 1);
}
