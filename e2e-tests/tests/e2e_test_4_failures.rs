// E2E Test 4: Failure handling
// Unreachable backends and server rejections surface as notifications

mod e2e;

use e2e::helpers::{wait_until, TestEnv};
use search_dashboard::backend::SearchBackend;
use search_dashboard::model::{PageSize, SearchCriteria, SearchRequest, SourceSelection};
use search_dashboard::{Dashboard, DashboardCommand, DashboardError, HttpBackend, Phase};
use std::sync::Arc;

#[tokio::test]
async fn test_e2e_4_unreachable_backend() {
    // Nothing listens on the discard port
    let backend = Arc::new(HttpBackend::new("http://127.0.0.1:9"));
    let (handle, _task) = Dashboard::spawn(backend.clone(), backend, PageSize::Ten);

    let snapshot = wait_until(&handle, |s| s.phase == Phase::QueryFailed).await;
    assert!(snapshot.criteria.source.is_none());
    assert!(snapshot.notification.as_ref().is_some_and(|n| n.is_error()));
    assert!(!snapshot.querying_enabled);
}

#[tokio::test]
async fn test_e2e_4_unknown_source_is_rejected() {
    let env = TestEnv::start().await;
    let backend = env.backend();

    let criteria = SearchCriteria {
        source: Some(SourceSelection::new("ghost")),
        ..Default::default()
    };
    let request = SearchRequest::from_criteria(&criteria).unwrap();
    let err = backend.search(request).await.unwrap_err();

    match err {
        DashboardError::Rejected(message) => assert_eq!(message, "Unknown source: ghost"),
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_e2e_4_reopen_keeps_selection() {
    let env = TestEnv::start().await;
    let (handle, _task) = env.dashboard();
    wait_until(&handle, |s| s.phase == Phase::Ready).await;

    // Reopening the source menu refetches and keeps the selection
    handle.send(DashboardCommand::OpenSourceMenu).await.unwrap();
    let snapshot = wait_until(&handle, |s| {
        !s.source_menu.is_loading() && s.source_menu.options().len() == 2
    })
    .await;
    assert!(snapshot.source_menu.is_selected("pets"));
    assert_eq!(snapshot.criteria.source_id(), Some("pets"));
    assert_eq!(snapshot.phase, Phase::Ready);
}
