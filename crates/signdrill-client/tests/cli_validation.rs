//! Parsed command lines run end to end against a stub classifier.

use clap::Parser;
use signdrill_client::{run, Cli, RunOutcome};
use signdrill_core::Error;
use signdrill_test_utils::StubServer;

const HEALTHY: &str = r#"{"status":"healthy","model_loaded":true}"#;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("signdrill").chain(args.iter().copied())).unwrap()
}

#[tokio::test]
async fn health_command_reports_a_live_backend() {
    let server = StubServer::start().await.unwrap();
    server.route("GET", "/health", 200, HEALTHY);

    let cli = parse(&["health", "--api-url", &server.url()]);
    assert_eq!(run(&cli).await.unwrap(), RunOutcome::Completed);
}

#[tokio::test]
async fn health_command_reports_a_dead_backend() {
    let server = StubServer::start().await.unwrap();
    server.route("GET", "/health", 503, r#"{"status":"loading"}"#);

    let cli = parse(&["health", "--api-url", &server.url()]);
    let outcome = run(&cli).await.unwrap();
    assert_eq!(outcome, RunOutcome::Unhealthy);
    assert_eq!(outcome.exit_code(), 1);
}

#[tokio::test]
async fn sampling_commands_need_frames() {
    let cli = parse(&["practice", "--letter", "a"]);
    assert!(matches!(run(&cli).await, Err(Error::InvalidConfig { .. })));
}

#[tokio::test]
async fn frame_directory_without_images_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let dir_arg = dir.path().to_string_lossy().into_owned();

    let cli = parse(&["recognize", "--frames", &dir_arg]);
    assert!(matches!(run(&cli).await, Err(Error::Acquisition { .. })));
}

#[tokio::test]
async fn invalid_challenge_settings_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("frame.jpg"), b"jpeg").unwrap();
    let dir_arg = dir.path().to_string_lossy().into_owned();

    let cli = parse(&["challenge", "--frames", &dir_arg, "--max-failures", "0"]);
    assert!(matches!(run(&cli).await, Err(Error::InvalidConfig { .. })));
}

#[tokio::test]
async fn practice_completes_against_the_stub() {
    let server = StubServer::start().await.unwrap();
    server.route(
        "POST",
        "/predict",
        200,
        r#"{"letter":"A","confidence":0.93,"landmarks_detected":true}"#,
    );
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("frame.jpg"), b"jpeg").unwrap();
    let dir_arg = dir.path().to_string_lossy().into_owned();

    let cli = parse(&[
        "practice",
        "-l",
        "a",
        "--api-url",
        &server.url(),
        "--frames",
        &dir_arg,
        "--interval-ms",
        "100",
        "--hold-ms",
        "300",
    ]);
    let outcome = tokio::time::timeout(std::time::Duration::from_secs(10), run(&cli))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome, RunOutcome::Completed);

    let requests = server.requests();
    assert!(requests.len() >= 2);
    assert!(requests.iter().all(|r| r.path == "/predict"));
}
