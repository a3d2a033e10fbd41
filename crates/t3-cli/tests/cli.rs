//! End-to-end tests for the `t3` binary against local stand-in upstreams.

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use predicates::prelude::*;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../docs/fixtures")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("fixture {} should exist: {}", path.display(), e))
}

async fn tfl_arrivals(Path(naptan): Path<String>) -> impl IntoResponse {
    let body = match naptan.as_str() {
        "490010781S" => fixture("tfl_arrivals_inbound.json"),
        "490010781N" => fixture("tfl_arrivals_outbound.json"),
        _ => return (StatusCode::NOT_FOUND, String::new()).into_response(),
    };
    ([("content-type", "application/json")], body).into_response()
}

fn upstream() -> Router {
    Router::new()
        .route("/StopPoint/{naptan}/arrivals", get(tfl_arrivals))
        .route(
            "/departures/{from}/to/{to}",
            get(|| async { fixture("huxley_departures.json") }),
        )
        .route(
            "/service/{id}",
            get(|| async { fixture("huxley_service.json") }),
        )
}

/// Serve the stand-in upstream from a background thread for the life of the test binary.
fn serve_upstream() -> String {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind ephemeral port");
            let addr = listener.local_addr().expect("listener address");
            tx.send(format!("http://{}", addr)).expect("send address");
            axum::serve(listener, upstream()).await.expect("upstream server");
        });
    });
    rx.recv().expect("upstream address")
}

fn t3() -> Command {
    let mut cmd = cargo_bin_cmd!("t3");
    cmd.env("RUST_LOG", "error")
        .env_remove("TRAINS_PROVIDER")
        .env_remove("DARWIN_API_KEY")
        .env_remove("TFL_API_KEY");
    cmd
}

#[test]
fn help_lists_commands() {
    t3().arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("bus"))
        .stdout(predicate::str::contains("trains"));
}

#[test]
fn bus_json_reports_both_directions() {
    let base = serve_upstream();
    let output = t3()
        .env("T3_TFL_BASE_URL", &base)
        .args(["bus", "--stop", "parklands"])
        .output()
        .expect("run t3");
    assert!(output.status.success());

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(body["stop"], "Parklands");
    assert_eq!(body["inbound"]["seconds"], serde_json::json!([150, 459]));
    assert_eq!(body["outbound"]["destination"], "Hook");
}

#[test]
fn bus_text_is_terse() {
    let base = serve_upstream();
    t3().env("T3_TFL_BASE_URL", &base)
        .args(["--format", "text", "bus"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Parklands (K2)"))
        .stdout(predicate::str::contains("Kingston: 2, 7 min"))
        .stdout(predicate::str::contains("Hook: 5 min"));
}

#[test]
fn trains_text_uses_huxley_by_default() {
    let base = serve_upstream();
    t3().env("T3_HUXLEY_BASE_URL", &base)
        .args(["trains", "--from", "sur", "--to", "wat", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Surbiton -> London Waterloo"))
        .stdout(predicate::str::contains("10:22  plat 4  CANCELLED"));
}

#[test]
fn missing_darwin_key_fails() {
    t3().args(["trains", "--provider", "darwin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Darwin API key not configured"));
}

#[test]
fn invalid_provider_env_fails_trains() {
    t3().env("TRAINS_PROVIDER", "teletext")
        .arg("trains")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown train provider 'teletext'"));
}

#[test]
fn invalid_provider_env_does_not_affect_bus() {
    let base = serve_upstream();
    t3().env("TRAINS_PROVIDER", "teletext")
        .env("T3_TFL_BASE_URL", &base)
        .args(["--format", "text", "bus"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Parklands (K2)"));
}

#[test]
fn provider_flag_overrides_env() {
    let base = serve_upstream();
    t3().env("TRAINS_PROVIDER", "teletext")
        .env("T3_HUXLEY_BASE_URL", &base)
        .args(["trains", "--provider", "huxley"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"originName\": \"Surbiton\""));
}
