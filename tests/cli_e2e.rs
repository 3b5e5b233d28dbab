//! End-to-end CLI tests for the datos binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::detail_page;
use support::socket_guard::start_mock_server_or_skip;

/// Binary with config lookup pointed at an empty directory.
fn datos(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("datos").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let temp = TempDir::new().unwrap();
    datos(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolve, download and load datasets"))
        .stdout(predicate::str::contains("search"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let temp = TempDir::new().unwrap();
    datos(&temp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("datos"));
}

/// Test that a missing subcommand causes non-zero exit.
#[test]
fn test_binary_without_subcommand_fails() {
    let temp = TempDir::new().unwrap();
    datos(&temp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let temp = TempDir::new().unwrap();
    datos(&temp)
        .args(["load", "x.csv", "--invalid-flag"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_load_prints_header_and_rows() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("ventas.csv");
    std::fs::write(&path, "mes;monto\nenero;10\nfebrero;12\nmarzo;9\n").unwrap();

    datos(&temp)
        .args(["-q", "load"])
        .arg(&path)
        .args(["--rows", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mes\tmonto"))
        .stdout(predicate::str::contains("febrero\t12"))
        .stdout(predicate::str::contains("marzo").not());
}

#[test]
fn test_load_missing_file_fails() {
    let temp = TempDir::new().unwrap();
    datos(&temp)
        .args(["-q", "load"])
        .arg(temp.path().join("nada.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("nada.csv"));
}

#[test]
fn test_invalid_config_file_fails() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    std::fs::write(&config, "timeout_secs = 0\n").unwrap();
    datos(&temp)
        .arg("--config")
        .arg(&config)
        .args(["load", "x.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout_secs"));
}

#[tokio::test]
async fn test_resolve_prints_record_and_saves_sidecar() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/dataset/padron"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("/meta/padron.json", &[])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/meta/padron.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{ "id": "abc-1", "name": "padron", "title": "Padrón nominal" }]
        })))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let root = temp.path().join("datasets");
    let base_url = server.uri();
    datos(&temp)
        .args(["-q", "--base-url", base_url.as_str(), "resolve", "padron", "--save", "--dest"])
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"abc-1\""))
        .stdout(predicate::str::contains("Padrón nominal"));

    assert!(root.join("abc-1").join("abc-1.json").is_file());
}

#[tokio::test]
async fn test_resolve_failure_exits_non_zero() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let base_url = server.uri();
    datos(&temp)
        .args(["-q", "--base-url", base_url.as_str(), "resolve", "caido"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not resolve caido"));
}
