//! Binary-level checks of the exprobe CLI.

mod support;

use std::io::Write;

use assert_cmd::assert::{Assert, OutputAssertExt};
use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::NamedTempFile;

use support::stub_server::{Reply, StubServer};

const CREDENTIAL_VARS: &[&str] = &[
    "BINANCE_API_KEY",
    "BINANCE_SECRET_KEY",
    "BINANCE_RSA_API_KEY",
    "BINANCE_RSA_PRIVATE_KEY_PATH",
    "BINANCE_ED25519_API_KEY",
    "BINANCE_ED25519_PRIVATE_KEY_PATH",
    "TEST_ALL_AUTH_TYPES",
];

fn exprobe() -> Command {
    let mut command = cargo_bin_cmd!("exprobe");
    for var in CREDENTIAL_VARS {
        command.env_remove(var);
    }
    command.env("RUST_LOG", "error");
    command
}

fn stdout_json(assert: &Assert) -> Value {
    let output = assert.get_output();
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}).\nstdout: {stdout}\nstderr: {}",
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

#[test]
fn help_lists_commands() {
    exprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("matrix"))
        .stdout(predicate::str::contains("units"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn units_lists_bundled_suite_as_json() {
    let assert = exprobe().args(["--json", "units"]).assert().success();

    let doc = stdout_json(&assert);
    let units = doc["units"].as_array().expect("units array");
    assert_eq!(units.len(), 5);
    assert!(units.iter().all(|u| u["required"] == "NONE"));
    assert!(units.iter().any(|u| u["name"] == "Server Time"));
}

#[test]
fn units_filter_narrows_listing() {
    exprobe()
        .args(["--json", "units", "--filter", "price"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Average Price"))
        .stdout(predicate::str::contains("Server Time").not());
}

#[test]
fn matrix_without_credentials_is_public_only() {
    let assert = exprobe()
        .args(["--json", "matrix", "--all-auth"])
        .assert()
        .success();

    let doc = stdout_json(&assert);
    let configurations = doc["configurations"].as_array().expect("configurations");
    assert_eq!(configurations.len(), 1);
    assert_eq!(configurations[0]["name"], "Public Endpoints");
    assert_eq!(configurations[0]["tier"], "NONE");
}

#[test]
fn matrix_with_hmac_credentials_adds_configuration() {
    let assert = exprobe()
        .args(["--json", "matrix"])
        .env("BINANCE_API_KEY", "key")
        .env("BINANCE_SECRET_KEY", "secret")
        .assert()
        .success();

    let doc = stdout_json(&assert);
    let names: Vec<&str> = doc["configurations"]
        .as_array()
        .expect("configurations")
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names, ["HMAC Authentication", "Public Endpoints"]);
}

#[test]
fn invalid_config_exits_with_harness_error() {
    let mut file = NamedTempFile::new().expect("temp config");
    file.write_all(b"[harness]\nworkers = 0\n").expect("write config");

    exprobe()
        .args(["check", "config", "--config"])
        .arg(file.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("workers"));
}

#[test]
fn valid_config_passes_check() {
    let mut file = NamedTempFile::new().expect("temp config");
    file.write_all(b"[harness]\nmin_interval_ms = 100\n").expect("write config");

    let assert = exprobe()
        .args(["--json", "check", "config", "--config"])
        .arg(file.path())
        .assert()
        .success();

    let doc = stdout_json(&assert);
    assert_eq!(doc["valid"], true);
    assert_eq!(doc["min_interval_ms"], 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_reports_json_and_exit_code() {
    let server = StubServer::start(|path: &str| match path {
        "/api/v3/ping" => Reply::json("{}"),
        _ => Reply::status(400, "not json at all"),
    })
    .await;

    let base_url = server.base_url.clone();
    let output = tokio::task::spawn_blocking(move || {
        exprobe()
            .args(["--json", "run", "--min-interval-ms", "0", "--base-url"])
            .arg(base_url)
            .output()
    })
    .await
    .expect("join")
    .expect("run exprobe");

    let assert = output.assert().code(1);
    let doc = stdout_json(&assert);
    assert_eq!(doc["summary"]["total"], 5);
    assert_eq!(doc["summary"]["passed"], 1);
    assert_eq!(doc["summary"]["failed"], 4);
    assert_eq!(doc["exit_code"], 1);
    assert!(doc["results"]
        .as_array()
        .expect("results")
        .iter()
        .filter(|r| r["outcome"] == "failed")
        .all(|r| r["reason"]
            .as_str()
            .is_some_and(|reason| reason.contains("malformed request"))));
}
