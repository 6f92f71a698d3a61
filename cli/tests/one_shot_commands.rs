use std::path::Path;

use anyhow::Result;
use core_test_support::mount_search;
use core_test_support::mount_video;
use core_test_support::search_body;
use core_test_support::start_mock_server;
use predicates::str::contains;
use pretty_assertions::assert_eq;
use serde_json::Value as JsonValue;
use serde_json::json;
use tempfile::TempDir;
use wiremock::ResponseTemplate;

fn smarttrace_command(home: &Path, server_url: &str) -> Result<assert_cmd::Command> {
    let mut cmd = assert_cmd::Command::cargo_bin("smarttrace")?;
    cmd.env("SMARTTRACE_HOME", home)
        .env_remove("RUST_LOG")
        .args(["--server-url", server_url]);
    Ok(cmd)
}

#[test]
fn show_without_cached_results_fails() -> Result<()> {
    let home = TempDir::new()?;
    smarttrace_command(home.path(), "http://127.0.0.1:1")?
        .args(["show", "1"])
        .assert()
        .failure()
        .stderr(contains("no cached search results"));
    Ok(())
}

#[test]
fn blank_search_is_rejected_before_any_request() -> Result<()> {
    let home = TempDir::new()?;
    smarttrace_command(home.path(), "http://127.0.0.1:1")?
        .args(["search", "   "])
        .assert()
        .failure()
        .stderr(contains("enter a text query or pass --image"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn search_then_show_and_play() -> Result<()> {
    let home = TempDir::new()?;
    let server = start_mock_server().await;
    mount_search(
        &server,
        ResponseTemplate::new(200).set_body_json(search_body(&[0.91, 0.77, 0.5])),
    )
    .await;
    mount_video(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "video_url": "/static/video_crop/1_2_10.mp4",
            "cached": false
        })),
    )
    .await;
    let uri = server.uri();

    let output = smarttrace_command(home.path(), &uri)?
        .args(["search", "red car"])
        .output()?;
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("Found 3 Matches\n"), "{stdout}");
    assert!(stdout.contains("  1. ID: 1"));
    assert!(stdout.contains("91.0%"));
    assert!(stdout.contains("Cams: 2, 3"));

    smarttrace_command(home.path(), &uri)?
        .args(["show", "2", "--sequence", "1", "--camera", "3"])
        .assert()
        .success()
        .stdout(contains("Global ID: 2"))
        .stdout(contains("Filter: Sequence 1 / Camera 3"))
        .stdout(contains("[1] CAM-3  SEQ-1 | OBJ-21"));

    let output = smarttrace_command(home.path(), &uri)?
        .args(["play", "1", "--json"])
        .output()?;
    assert!(output.status.success(), "{output:?}");
    let session: JsonValue = serde_json::from_slice(&output.stdout)?;
    assert_eq!(session["state"], "Playing");
    assert_eq!(session["label"], "CAM-2 | SEQ-1");
    assert_eq!(
        session["video_url"],
        format!("{uri}/static/video_crop/1_2_10.mp4")
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn camera_filter_requires_sequence() -> Result<()> {
    let home = TempDir::new()?;
    let server = start_mock_server().await;
    mount_search(
        &server,
        ResponseTemplate::new(200).set_body_json(search_body(&[0.9])),
    )
    .await;
    let uri = server.uri();

    smarttrace_command(home.path(), &uri)?
        .args(["search", "bag"])
        .assert()
        .success();
    smarttrace_command(home.path(), &uri)?
        .args(["show", "1", "--camera", "2"])
        .assert()
        .failure()
        .stderr(contains("camera filter is disabled until a sequence is selected"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_clip_exits_with_message() -> Result<()> {
    let home = TempDir::new()?;
    let server = start_mock_server().await;
    mount_search(
        &server,
        ResponseTemplate::new(200).set_body_json(search_body(&[0.9])),
    )
    .await;
    mount_video(
        &server,
        ResponseTemplate::new(404).set_body_json(json!({"error": "clip not found"})),
    )
    .await;
    let uri = server.uri();

    smarttrace_command(home.path(), &uri)?
        .args(["search", "bag"])
        .assert()
        .success();
    smarttrace_command(home.path(), &uri)?
        .args(["play", "1", "--node", "2"])
        .assert()
        .failure()
        .stderr(contains("VIDEO FAILED: Could not load video: clip not found"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn search_failure_clears_previous_results() -> Result<()> {
    let home = TempDir::new()?;
    let server = start_mock_server().await;
    mount_search(
        &server,
        ResponseTemplate::new(200).set_body_json(search_body(&[0.9])),
    )
    .await;
    let uri = server.uri();
    smarttrace_command(home.path(), &uri)?
        .args(["search", "bag"])
        .assert()
        .success();

    let broken = start_mock_server().await;
    mount_search(
        &broken,
        ResponseTemplate::new(500).set_body_json(json!({"error": "index offline"})),
    )
    .await;
    smarttrace_command(home.path(), &broken.uri())?
        .args(["search", "bag"])
        .assert()
        .failure()
        .stderr(contains("Search failed: index offline"));
    smarttrace_command(home.path(), &uri)?
        .args(["show", "1"])
        .assert()
        .failure()
        .stderr(contains("no cached search results"));
    Ok(())
}
