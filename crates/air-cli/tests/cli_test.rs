//! Command tests against a temporary profile directory (demo mode)

use air_cli::{run, Args};
use clap::Parser;
use tempfile::TempDir;

async fn air(dir: &TempDir, argv: &[&str]) -> anyhow::Result<String> {
    let data_dir = dir.path().to_string_lossy().to_string();
    let mut full = vec!["air", "--data-dir", data_dir.as_str(), "--enable-demo-auth", "true"];
    full.extend_from_slice(argv);
    let args = Args::try_parse_from(full)?;

    let mut out = Vec::new();
    run(&args, &mut out).await?;
    Ok(String::from_utf8(out)?)
}

#[tokio::test]
async fn test_guest_then_demo_session() {
    let dir = TempDir::new().unwrap();

    assert_eq!(air(&dir, &["status"]).await.unwrap().trim(), "guest");
    assert!(air(&dir, &["save", "opp-001"]).await.is_err());

    let started = air(&dir, &["demo", "start", "--email", "kim@example.org"]).await.unwrap();
    assert!(started.contains("kim@example.org"));
    let status = air(&dir, &["status"]).await.unwrap();
    assert!(status.contains("demo"));

    air(&dir, &["demo", "stop"]).await.unwrap();
    assert_eq!(air(&dir, &["status"]).await.unwrap().trim(), "guest");
}

#[tokio::test]
async fn test_pipeline_commands() {
    let dir = TempDir::new().unwrap();
    air(&dir, &["demo", "start"]).await.unwrap();

    let added = air(
        &dir,
        &[
            "pipeline", "add", "--title", "Soundwalk", "--client", "Northline Radio", "--due",
            "2026-05-01", "--value", "1200",
        ],
    )
    .await
    .unwrap();
    assert!(added.starts_with("added Soundwalk"));

    let listing = air(&dir, &["pipeline", "list"]).await.unwrap();
    assert!(listing.contains("To Pitch"));
    assert!(listing.contains("Soundwalk"));

    let tracked = air(&dir, &["track", "opp-002"]).await.unwrap();
    assert!(tracked.contains("$15000"));

    let bad = air(
        &dir,
        &[
            "pipeline", "add", "--title", "Nothing", "--client", "Nobody", "--due", "2026-05-01",
            "--value", "0",
        ],
    )
    .await;
    assert!(bad.is_err());
}

#[tokio::test]
async fn test_dashboard_task_toggle_persists() {
    let dir = TempDir::new().unwrap();
    air(&dir, &["demo", "start"]).await.unwrap();

    let before = air(&dir, &["dashboard"]).await.unwrap();
    assert!(before.contains("focus 0%"));
    assert!(before.contains("[ ] 1. Send 2 pitch follow-ups"));
    assert!(before.contains("To Pitch"));

    let after = air(&dir, &["dashboard", "task", "1"]).await.unwrap();
    assert!(after.contains("[x] 1. Send 2 pitch follow-ups"));
    assert!(!after.contains("focus 0%"));

    let again = air(&dir, &["dashboard"]).await.unwrap();
    assert!(again.contains("[x] 1. Send 2 pitch follow-ups"));

    assert!(air(&dir, &["dashboard", "task", "4"]).await.is_err());
}

#[tokio::test]
async fn test_quote_and_toolkit_need_no_session() {
    let dir = TempDir::new().unwrap();

    let q = air(&dir, &["quote", "--days", "3", "--revisions", "1"]).await.unwrap();
    assert!(q.contains("min $2003  target $2225  stretch $2559"));

    let rushed = air(&dir, &["quote", "--days", "3", "--revisions", "1", "--rush"]).await.unwrap();
    assert!(rushed.contains("target $2645"));

    let templates = air(&dir, &["toolkit", "templates"]).await.unwrap();
    assert!(templates.contains("kill-fee"));
    assert!(air(&dir, &["toolkit", "show", "nope"]).await.is_err());
}

#[tokio::test]
async fn test_advocacy_pledge_toggles() {
    let dir = TempDir::new().unwrap();

    let pledge = air(&dir, &["advocacy", "pledge", "written-terms"]).await.unwrap();
    assert!(pledge.contains("1/3 commitments"));

    air(&dir, &["advocacy", "log", "--details", "Invoice ignored"]).await.unwrap();
    let issues = air(&dir, &["advocacy", "issues"]).await.unwrap();
    assert!(issues.contains("Not provided"));
}

#[tokio::test]
async fn test_demo_disabled_cannot_start() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().to_string_lossy().to_string();
    let args = Args::try_parse_from([
        "air",
        "--data-dir",
        data_dir.as_str(),
        "--enable-demo-auth",
        "false",
        "demo",
        "start",
    ])
    .unwrap();

    let mut out = Vec::new();
    assert!(run(&args, &mut out).await.is_err());
}
