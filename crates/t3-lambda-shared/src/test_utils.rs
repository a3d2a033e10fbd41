//! Test utilities for Lambda handler testing.
//!
//! These build API Gateway events, load upstream fixtures from
//! `docs/fixtures`, and serve a local stand-in for an upstream API so
//! handlers can be exercised end to end without network access.
//!
//! ```ignore
//! use t3_lambda_shared::test_utils::{fixture, rest_event, serve_upstream};
//!
//! #[tokio::test]
//! async fn test_handler() {
//!     let base = serve_upstream(router).await;
//!     let event = rest_event("GET", &[("stop", "parklands")]);
//!     // ... invoke the handler
//! }
//! ```

use std::path::PathBuf;

use axum::Router;
use lambda_runtime::{Context, LambdaEvent};
use serde_json::{json, Map, Value};

use t3_lib::{build_client, Settings};

use crate::LambdaRuntime;

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// Read a fixture file from `docs/fixtures`.
pub fn fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("fixture {} should exist: {}", path.display(), e))
}

/// Create a mock request ID for testing.
///
/// Returns a request ID string in the format "test-request-{suffix}".
pub fn mock_request_id(suffix: &str) -> String {
    format!("test-request-{}", suffix)
}

fn query_value(params: &[(&str, &str)]) -> Value {
    if params.is_empty() {
        return Value::Null;
    }
    let map: Map<String, Value> = params
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();
    Value::Object(map)
}

/// A REST API (payload v1) proxy event.
pub fn rest_event(method: &str, params: &[(&str, &str)]) -> Value {
    json!({
        "resource": "/",
        "path": "/",
        "httpMethod": method,
        "headers": { "Accept": "application/json" },
        "queryStringParameters": query_value(params),
        "requestContext": { "stage": "prod" },
        "body": null,
        "isBase64Encoded": false
    })
}

/// An HTTP API (payload v2) proxy event.
pub fn http_api_event(method: &str, params: &[(&str, &str)]) -> Value {
    let mut event = json!({
        "version": "2.0",
        "routeKey": "$default",
        "rawPath": "/",
        "requestContext": { "http": { "method": method, "path": "/" } },
        "isBase64Encoded": false
    });
    if !params.is_empty() {
        event["queryStringParameters"] = query_value(params);
    }
    event
}

/// Wrap a payload the way the Lambda runtime delivers it.
pub fn lambda_event(payload: Value) -> LambdaEvent<Value> {
    LambdaEvent::new(payload, Context::default())
}

/// A runtime that talks to the given settings with a real client.
pub fn runtime_with(settings: Settings) -> LambdaRuntime {
    LambdaRuntime::new(settings, build_client().expect("client builds"))
}

/// Serve `router` on an ephemeral localhost port and return its base URL.
pub async fn serve_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("upstream server");
    });
    format!("http://{}", addr)
}
