use anyhow::Result;
use assert_matches::assert_matches;
use core_test_support::backend_for;
use core_test_support::mount_search;
use core_test_support::search_body;
use core_test_support::start_mock_server;
use pretty_assertions::assert_eq;
use serde_json::json;
use smarttrace_core::DetailHandoff;
use smarttrace_core::DetailView;
use smarttrace_core::ResultCache;
use smarttrace_core::SearchQuery;
use smarttrace_core::SearchSession;
use smarttrace_core::SearchView;
use smarttrace_core::error::SearchError;
use smarttrace_core::grid::CardAction;
use tempfile::TempDir;
use wiremock::ResponseTemplate;

const FALLBACK: &str = "static/assets/SmartTraceRetrieval.png";

#[tokio::test]
async fn red_car_query_renders_three_matches() -> Result<()> {
    let server = start_mock_server().await;
    mount_search(
        &server,
        ResponseTemplate::new(200).set_body_json(search_body(&[0.91, 0.77, 0.50])),
    )
    .await;

    let backend = backend_for(&server);
    let mut session = SearchSession::new(ResultCache::in_memory(), FALLBACK);
    session
        .submit(&backend, &SearchQuery::text("red car"))
        .await?;

    let SearchView::Results(grid) = session.view() else {
        panic!("expected results, got {:?}", session.view());
    };
    assert_eq!(grid.heading.as_deref(), Some("Found 3 Matches"));
    assert_eq!(grid.cards[0].badge, "91.0%");
    assert_eq!(grid.cards[0].title, "ID: 1");
    assert_eq!(grid.cards[0].subtitle, "Cams: 2, 3");
    assert_eq!(grid.cards[2].badge, "50.0%");
    Ok(())
}

#[tokio::test]
async fn failed_search_after_success_leaves_no_stale_results() -> Result<()> {
    let dir = TempDir::new()?;
    let session_file = dir.path().join("results.json");
    let server = start_mock_server().await;
    let backend = backend_for(&server);
    let mut session = SearchSession::new(ResultCache::with_session_file(session_file.clone()), FALLBACK);

    mount_search(
        &server,
        ResponseTemplate::new(200).set_body_json(search_body(&[0.6])),
    )
    .await;
    session.submit(&backend, &SearchQuery::text("first")).await?;
    assert!(session_file.exists());

    server.reset().await;
    mount_search(
        &server,
        ResponseTemplate::new(503).set_body_json(json!({"error": "index rebuilding"})),
    )
    .await;
    let err = session
        .submit(&backend, &SearchQuery::text("second"))
        .await
        .unwrap_err();
    assert_matches!(err, SearchError::Service(_));
    assert!(!session.is_loading());
    assert_eq!(session.cache().get(), None);
    assert!(!session_file.exists());

    // a fresh session finds nothing to restore
    let mut reopened = SearchSession::new(ResultCache::with_session_file(session_file), FALLBACK);
    assert!(!reopened.restore());
    Ok(())
}

#[tokio::test]
async fn restored_session_feeds_the_detail_view() -> Result<()> {
    let dir = TempDir::new()?;
    let session_file = dir.path().join("results.json");
    let server = start_mock_server().await;
    mount_search(
        &server,
        ResponseTemplate::new(200).set_body_json(search_body(&[0.8, 0.4])),
    )
    .await;

    let mut first = SearchSession::new(ResultCache::with_session_file(session_file.clone()), FALLBACK);
    first
        .submit(&backend_for(&server), &SearchQuery::text("backpack"))
        .await?;

    let mut second = SearchSession::new(ResultCache::with_session_file(session_file), FALLBACK);
    assert!(second.restore());
    assert_eq!(second.view(), first.view());

    let SearchView::Results(grid) = second.view() else {
        panic!("expected restored results");
    };
    let CardAction::OpenDetail { result_index } = grid.cards[1].action else {
        panic!("result cards open the detail view");
    };
    let mut handoff = DetailHandoff::default();
    handoff.select(second.select(result_index).unwrap_or_else(|| panic!("card {result_index}")));
    let detail = DetailView::open(&mut handoff, FALLBACK)?;
    assert_eq!(detail.header().confidence, "40.0%");
    assert_eq!(detail.header().node_count, "02");
    assert_eq!(detail.statistics().rows()[0].cameras_label(), "Cam 2, 3");
    Ok(())
}
