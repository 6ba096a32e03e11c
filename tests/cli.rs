//! End-to-end checks of the `jsync` binary's fail-closed behaviour.

use assert_cmd::Command;
use tempfile::TempDir;

/// A `jsync` command isolated from the caller's environment and home.
fn jsync(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("jsync").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("JSYNC_DB")
        .env_remove("JIRA_BASE_URL")
        .env_remove("JIRA_EMAIL")
        .env_remove("JIRA_API_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_sync_without_database_is_config_error() {
    let home = TempDir::new().unwrap();

    let output = jsync(&home).args(["sync", "projects"]).output().unwrap();

    assert_eq!(output.status.code(), Some(7));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("CONFIG_ERROR"), "stderr: {stderr}");
}

#[test]
fn test_sync_without_remote_does_not_create_database() {
    let home = TempDir::new().unwrap();
    let db = home.path().join("mirror.db");

    let output = jsync(&home)
        .args(["sync", "all", "--db"])
        .arg(&db)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(7));
    assert!(!db.exists());
}

#[test]
fn test_worklogs_without_selector_is_invalid_argument() {
    let home = TempDir::new().unwrap();
    let db = home.path().join("mirror.db");

    let output = jsync(&home)
        .args(["worklogs", "--db"])
        .arg(&db)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("INVALID_ARGUMENT"), "stderr: {stderr}");
    assert!(!db.exists());
}

#[test]
fn test_worklogs_on_fresh_database() {
    let home = TempDir::new().unwrap();
    let db = home.path().join("nested").join("mirror.db");

    let output = jsync(&home)
        .args(["worklogs", "--issue-key", "OPS-1", "--json", "--db"])
        .arg(&db)
        .output()
        .unwrap();

    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body, serde_json::json!({"worklogs": []}));
    assert!(db.exists());
}

#[test]
fn test_database_from_env() {
    let home = TempDir::new().unwrap();
    let db = home.path().join("env.db");

    let output = jsync(&home)
        .env("JSYNC_DB", &db)
        .args(["status", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["counts"]["projects"], 0);
}

#[test]
fn test_version() {
    let home = TempDir::new().unwrap();

    let output = jsync(&home).args(["version", "--json"]).output().unwrap();

    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["name"], "jsync");
}
