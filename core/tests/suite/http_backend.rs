use std::time::Duration;

use anyhow::Result;
use assert_matches::assert_matches;
use core_test_support::SEARCH_PATH;
use core_test_support::backend_for;
use core_test_support::backend_with_timeout;
use core_test_support::mount_search;
use core_test_support::mount_video;
use core_test_support::sample_track;
use core_test_support::search_body;
use core_test_support::start_mock_server;
use pretty_assertions::assert_eq;
use serde_json::json;
use smarttrace_core::Attachment;
use smarttrace_core::HttpBackend;
use smarttrace_core::RetrievalBackend;
use smarttrace_core::SearchQuery;
use smarttrace_core::error::ServiceError;
use smarttrace_core::protocol::Ident;
use smarttrace_core::protocol::VideoRequest;
use wiremock::Mock;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_partial_json;
use wiremock::matchers::method;
use wiremock::matchers::path;

#[tokio::test]
async fn search_sends_multipart_query_and_parses_tracks() -> Result<()> {
    let server = start_mock_server().await;
    mount_search(
        &server,
        ResponseTemplate::new(200).set_body_json(search_body(&[0.91, 0.77])),
    )
    .await;

    let backend = backend_for(&server);
    let query = SearchQuery::new(
        "  red car ",
        Some(Attachment {
            file_name: "probe.png".to_string(),
            mime: "image/png".to_string(),
            bytes: b"PNGDATA".to_vec(),
        }),
    );
    let results = backend.search(&query).await?;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].global_id, Ident::from(1_i64));
    assert_eq!(results[0].nodes.len(), 2);

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.url.path(), SEARCH_PATH);
    let content_type = request
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data"), "{content_type}");
    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"query\""));
    assert!(body.contains("\r\nred car\r\n"), "query must be trimmed: {body}");
    assert!(body.contains("name=\"file\"; filename=\"probe.png\""));
    assert!(body.contains("PNGDATA"));
    Ok(())
}

#[tokio::test]
async fn search_without_attachment_omits_file_part() -> Result<()> {
    let server = start_mock_server().await;
    mount_search(&server, ResponseTemplate::new(200).set_body_json(json!([]))).await;

    let results = backend_for(&server)
        .search(&SearchQuery::text("bag"))
        .await?;
    assert!(results.is_empty());

    let requests = server.received_requests().await.unwrap_or_default();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(!body.contains("name=\"file\""));
    Ok(())
}

#[tokio::test]
async fn non_success_status_carries_server_message() {
    let server = start_mock_server().await;
    mount_search(
        &server,
        ResponseTemplate::new(500).set_body_json(json!({"error": "Processing failed", "details": "trace"})),
    )
    .await;

    let err = backend_for(&server)
        .search(&SearchQuery::text("x"))
        .await
        .unwrap_err();
    assert_matches!(
        &err,
        ServiceError::Server { status: 500, message: Some(m) } if m == "Processing failed"
    );
    assert_eq!(err.user_message(), "Processing failed");
}

#[tokio::test]
async fn malformed_body_is_reported() {
    let server = start_mock_server().await;
    mount_search(
        &server,
        ResponseTemplate::new(200).set_body_string("<html>oops</html>"),
    )
    .await;

    let err = backend_for(&server)
        .search(&SearchQuery::text("x"))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::MalformedResponse { .. });
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = start_mock_server().await;
    mount_search(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!([]))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let backend = backend_with_timeout(&server, Duration::from_millis(200));
    let err = backend.search(&SearchQuery::text("x")).await.unwrap_err();
    assert!(err.is_transport(), "{err:?}");
    assert_matches!(err, ServiceError::Timeout { .. });
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let base = "http://127.0.0.1:1/".parse().unwrap();
    let backend = HttpBackend::new(base, Duration::from_secs(2)).unwrap();

    let err = backend.search(&SearchQuery::text("x")).await.unwrap_err();
    assert!(err.is_transport(), "{err:?}");
    assert_matches!(err, ServiceError::Network { .. });
}

#[tokio::test]
async fn video_request_forwards_full_node_list() -> Result<()> {
    let server = start_mock_server().await;
    let track = sample_track();
    Mock::given(method("POST"))
        .and(path("/api/get_video"))
        .and(body_partial_json(json!({
            "global_id": 1,
            "seq_id": 1,
            "cam_id": 3,
            "obj_id": 20,
            "tracks": [
                {"seq_id": 1, "cam_id": 2, "obj_id": 10, "detections": [{"frame_id": 4, "bbox": [0, 0, 8, 8]}]},
                {"seq_id": 1, "cam_id": 3, "obj_id": 20}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "video_url": "/static/video_crop/1_1_3.mp4",
            "cached": false,
            "start_frame": 0,
            "end_frame": 60,
            "fps": 30
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = VideoRequest::for_node(&track, &track.nodes[1]);
    let response = backend_for(&server).fetch_video(&request).await?;
    assert_eq!(response.playable_url(), Some("/static/video_crop/1_1_3.mp4"));
    assert_eq!(response.end_frame, Some(60));
    Ok(())
}

#[tokio::test]
async fn video_error_status_keeps_error_text() {
    let server = start_mock_server().await;
    mount_video(
        &server,
        ResponseTemplate::new(404).set_body_json(json!({"error": "clip not found"})),
    )
    .await;

    let track = sample_track();
    let request = VideoRequest::for_node(&track, &track.nodes[0]);
    let err = backend_for(&server)
        .fetch_video(&request)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::Server { status: 404, message: Some(m) } if m == "clip not found"
    );
}

#[tokio::test]
async fn thumbnail_probe_reports_missing_assets() {
    let server = start_mock_server().await;
    Mock::given(method("HEAD"))
        .and(path("/static/thumbs/1.jpg"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/static/thumbs/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    assert!(backend.probe_thumbnail("/static/thumbs/1.jpg").await);
    assert!(!backend.probe_thumbnail("/static/thumbs/gone.jpg").await);
}
