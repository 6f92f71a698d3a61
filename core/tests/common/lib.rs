use std::time::Duration;

use serde_json::Value;
use serde_json::json;
use smarttrace_core::HttpBackend;
use smarttrace_core::protocol::Track;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;

pub const SEARCH_PATH: &str = "/api/search";
pub const VIDEO_PATH: &str = "/api/get_video";

pub async fn start_mock_server() -> MockServer {
    MockServer::start().await
}

/// Backend pointed at `server` with a short request bound.
pub fn backend_for(server: &MockServer) -> HttpBackend {
    backend_with_timeout(server, Duration::from_secs(5))
}

#[allow(clippy::expect_used)]
pub fn backend_with_timeout(server: &MockServer, timeout: Duration) -> HttpBackend {
    let base = server.uri().parse().expect("mock server uri");
    HttpBackend::new(base, timeout).expect("build backend")
}

/// Search payload with one track per score; every track has two sightings.
pub fn search_body(scores: &[f64]) -> Value {
    let items: Vec<Value> = scores
        .iter()
        .enumerate()
        .map(|(i, score)| {
            json!({
                "global_id": i + 1,
                "score": score,
                "thum_url": format!("/static/thumbs/{}.jpg", i + 1),
                "cameras": [2, 3, 2],
                "tracks": [
                    {"seq_id": 1, "cam_id": 2, "obj_id": 10 + i, "detections": [{"frame_id": 4, "bbox": [0, 0, 8, 8]}]},
                    {"seq_id": 1, "cam_id": 3, "obj_id": 20 + i}
                ]
            })
        })
        .collect();
    Value::Array(items)
}

#[allow(clippy::expect_used)]
pub fn sample_track() -> Track {
    let body = search_body(&[0.9]);
    serde_json::from_value(body[0].clone()).expect("sample track")
}

pub async fn mount_search(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(response)
        .mount(server)
        .await;
}

pub async fn mount_video(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(VIDEO_PATH))
        .respond_with(response)
        .mount(server)
        .await;
}
