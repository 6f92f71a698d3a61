use std::time::Duration;

use core_test_support::backend_for;
use core_test_support::mount_video;
use core_test_support::sample_track;
use core_test_support::start_mock_server;
use pretty_assertions::assert_eq;
use serde_json::json;
use smarttrace_core::ExternalPlayer;
use smarttrace_core::MediaPlayer;
use smarttrace_core::Resolution;
use smarttrace_core::RetrievalBackend;
use smarttrace_core::VideoSessionController;
use smarttrace_core::VideoState;
use smarttrace_core::video::FAILED_LABEL;
use wiremock::Mock;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_partial_json;
use wiremock::matchers::method;
use wiremock::matchers::path;

fn controller(server_uri: &str) -> VideoSessionController<ExternalPlayer> {
    let base = server_uri.parse().unwrap();
    VideoSessionController::new(ExternalPlayer::new(None)).with_base_url(base)
}

#[tokio::test]
async fn clip_not_found_keeps_modal_open() {
    let server = start_mock_server().await;
    mount_video(
        &server,
        ResponseTemplate::new(404).set_body_json(json!({"error": "clip not found"})),
    )
    .await;

    let track = sample_track();
    let mut controller = controller(&server.uri());
    let resolution = controller
        .play(&backend_for(&server), &track, &track.nodes[0])
        .await;

    assert_eq!(resolution, Resolution::Applied(VideoState::Failed));
    assert!(controller.is_modal_visible());
    let session = controller.session().unwrap();
    assert_eq!(session.label(), FAILED_LABEL);
    assert!(session.message().unwrap().contains("clip not found"));
}

#[tokio::test]
async fn successful_clip_is_loaded_with_absolute_url() {
    let server = start_mock_server().await;
    mount_video(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"video_url": "/static/video_crop/1.mp4"})),
    )
    .await;

    let track = sample_track();
    let mut controller = controller(&server.uri());
    let resolution = controller
        .play(&backend_for(&server), &track, &track.nodes[1])
        .await;

    // no player configured: autoplay is refused but the session still plays
    assert_eq!(resolution, Resolution::Applied(VideoState::Playing));
    let expected = format!("{}/static/video_crop/1.mp4", server.uri());
    assert_eq!(controller.player().source(), Some(expected.as_str()));
    assert_eq!(controller.session().unwrap().label(), "CAM-3 | SEQ-1");
}

#[tokio::test]
async fn slow_first_response_cannot_replace_second_session() {
    let server = start_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/api/get_video"))
        .and(body_partial_json(json!({"cam_id": 2})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"video_url": "/static/video_crop/a.mp4"}))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/get_video"))
        .and(body_partial_json(json!({"cam_id": 3})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"video_url": "/static/video_crop/b.mp4"})),
        )
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let track = sample_track();
    let mut controller = controller(&server.uri());

    let (token_a, request_a) = controller.open(&track, &track.nodes[0]);
    let (token_b, request_b) = controller.open(&track, &track.nodes[1]);
    let (response_a, response_b) =
        tokio::join!(backend.fetch_video(&request_a), backend.fetch_video(&request_b));

    assert_eq!(
        controller.resolve(token_b, response_b),
        Resolution::Applied(VideoState::Playing)
    );
    assert_eq!(controller.resolve(token_a, response_a), Resolution::Stale);

    let expected = format!("{}/static/video_crop/b.mp4", server.uri());
    assert_eq!(controller.player().source(), Some(expected.as_str()));
    assert_eq!(
        controller.session().and_then(|s| s.media_url()),
        Some(expected.as_str())
    );
}

#[tokio::test]
async fn network_failure_shows_network_label() {
    let track = sample_track();
    let backend = smarttrace_core::HttpBackend::new(
        "http://127.0.0.1:1/".parse().unwrap(),
        Duration::from_secs(2),
    )
    .unwrap();
    let mut controller = VideoSessionController::new(ExternalPlayer::new(None));
    let resolution = controller.play(&backend, &track, &track.nodes[0]).await;
    assert_eq!(resolution, Resolution::Applied(VideoState::Failed));
    assert_eq!(controller.session().unwrap().label(), "NETWORK ERROR");
}
