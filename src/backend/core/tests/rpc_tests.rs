//! Tests for the JSON-RPC adapter, driven through the axum router.
//!
//! Tests cover:
//! - Health endpoint
//! - Every RPC method, with named and positional params
//! - Error objects for core failures and protocol errors
//! - Batches

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use punchclock_core::api::{build_router, AppState};
use punchclock_core::events::Timestamp;
use punchclock_core::persistence::MemoryBackend;
use punchclock_core::service::{ClockService, FixedTimeSource};

// ============================================================================
// Test Utilities
// ============================================================================

fn at(time: &str) -> Timestamp {
    DateTime::parse_from_rfc3339(&format!("2024-03-01T{}Z", time)).unwrap()
}

async fn app() -> (Router, Arc<FixedTimeSource>, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let time = Arc::new(FixedTimeSource::new(at("09:00:00")));
    let service = ClockService::open(backend.clone(), time.clone(), None).await.unwrap();
    (build_router(AppState::new(Arc::new(service))), time, backend)
}

async fn post_raw(app: &Router, body: impl Into<Body>) -> Value {
    let request = Request::builder()
        .method("POST")
        .uri("/rpc")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn rpc(app: &Router, method: &str, params: Value) -> Value {
    let body = json!({ "jsonrpc": "2.0", "method": method, "params": params, "id": 1 });
    post_raw(app, body.to_string()).await
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (app, _, _) = app().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let health: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["storage"], "memory");
    assert_eq!(health["clocks"], 0);
    assert!(health["active"].is_null());
}

// ============================================================================
// Methods
// ============================================================================

#[tokio::test]
async fn test_clock_lifecycle_over_rpc() {
    let (app, time, backend) = app().await;

    let response = rpc(&app, "start", json!({ "id": "work" })).await;
    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["id"], 1);
    assert!(response["result"].is_null());
    assert!(response.get("error").is_none());

    let response = rpc(&app, "current", json!([])).await;
    assert_eq!(response["result"], "work");

    time.advance(Duration::minutes(45));
    let response = rpc(&app, "list", Value::Null).await;
    assert_eq!(
        response["result"],
        json!([{ "id": "work", "status": "in", "elapsed_seconds": 2700 }])
    );

    rpc(&app, "stop", json!(["work"])).await;
    let response = rpc(&app, "finish", json!({ "id": "work" })).await;
    assert_eq!(response["result"], 2700);

    let response = rpc(&app, "history", json!({ "id": "work" })).await;
    let history = response["result"].as_array().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[1]["event"], "stop");
    assert_eq!(history[1]["timestamp"], "2024-03-01T09:45:00+00:00");
    assert_eq!(history[2]["cumulative_seconds"], 2700);

    let response = rpc(&app, "current", json!({})).await;
    assert!(response["result"].is_null());
    assert_eq!(backend.saved_events().len(), 3);
}

#[tokio::test]
async fn test_rewrite_over_rpc() {
    let (app, _, _) = app().await;

    let events = json!([
        { "event": "stop", "timestamp": "2024-03-01T08:00:00+01:00" },
        { "event": "start", "timestamp": "2024-03-01T07:00:00+01:00" }
    ]);
    let response = rpc(&app, "rewrite", json!({ "id": "work", "events": events })).await;
    assert!(response.get("error").is_none());

    let response = rpc(&app, "list", json!({})).await;
    assert_eq!(response["result"][0]["status"], "out");
    assert_eq!(response["result"][0]["elapsed_seconds"], 3600);
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_core_errors_become_error_objects() {
    let (app, _, _) = app().await;

    rpc(&app, "start", json!({ "id": "a" })).await;
    let response = rpc(&app, "start", json!({ "id": "b" })).await;
    assert_eq!(response["error"]["code"], 1002);
    assert_eq!(response["error"]["data"]["error_code"], "CLOCK_ALREADY_ACTIVE");
    assert!(response["error"]["message"].as_str().unwrap().contains("a is already clocked in"));

    let response = rpc(&app, "stop", json!({ "id": "" })).await;
    assert_eq!(response["error"]["data"]["error_code"], "INVALID_IDENTIFIER");

    let response = rpc(&app, "history", json!({ "id": "nope" })).await;
    assert_eq!(response["error"]["data"]["error_code"], "CLOCK_NOT_FOUND");

    let response = rpc(
        &app,
        "rewrite",
        json!({ "id": "c", "events": [{ "event": "pause", "timestamp": "2024-03-01T07:00:00Z" }] }),
    )
    .await;
    assert_eq!(response["error"]["data"]["error_code"], "INVALID_EVENT_KIND");
    assert!(response["error"]["message"].as_str().unwrap().contains("pause"));

    // A malformed timestamp is still a params error.
    let response = rpc(
        &app,
        "rewrite",
        json!({ "id": "c", "events": [{ "event": "start", "timestamp": "yesterday" }] }),
    )
    .await;
    assert_eq!(response["error"]["code"], -32602);

    // The server keeps serving after failures.
    let response = rpc(&app, "current", json!({})).await;
    assert_eq!(response["result"], "a");
}

#[tokio::test]
async fn test_protocol_errors() {
    let (app, _, _) = app().await;

    let response = post_raw(&app, "{not json").await;
    assert_eq!(response["error"]["code"], -32700);
    assert!(response["id"].is_null());

    let response = rpc(&app, "pause", json!({})).await;
    assert_eq!(response["error"]["code"], -32601);

    let response = rpc(&app, "start", json!({})).await;
    assert_eq!(response["error"]["code"], -32602);

    let body = json!({ "jsonrpc": "1.0", "method": "list", "id": 9 });
    let response = post_raw(&app, body.to_string()).await;
    assert_eq!(response["error"]["code"], -32600);
    assert_eq!(response["id"], 9);

    let response = post_raw(&app, "[]").await;
    assert_eq!(response["error"]["code"], -32600);
}

#[tokio::test]
async fn test_batch() {
    let (app, _, _) = app().await;

    let body = json!([
        { "jsonrpc": "2.0", "method": "start", "params": ["a"], "id": 1 },
        { "jsonrpc": "2.0", "method": "start", "params": ["b"], "id": 2 },
        { "jsonrpc": "2.0", "method": "current", "id": 3 }
    ]);
    let response = post_raw(&app, body.to_string()).await;
    let responses = response.as_array().unwrap();

    assert_eq!(responses.len(), 3);
    assert!(responses[0].get("error").is_none());
    assert_eq!(responses[1]["error"]["code"], 1002);
    assert_eq!(responses[2]["result"], "a");
}
