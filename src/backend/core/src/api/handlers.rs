//! HTTP handlers.
//!
//! The RPC endpoint always answers `200 OK` with a JSON-RPC body; failures,
//! including unparseable bodies, travel as JSON-RPC error objects.

use axum::{body::Bytes, extract::State, response::IntoResponse, Json};
use serde_json::Value;

use super::rpc::{dispatch_value, RpcResponse};
use super::AppState;
use crate::error::PunchError;

// ═══════════════════════════════════════════════════════════════════════════════
// Health Check
// ═══════════════════════════════════════════════════════════════════════════════

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.service.snapshot().await;
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "storage": state.service.backend().describe(),
        "clocks": store.len(),
        "active": store.currently_clocked_in().map(|c| c.id.clone()),
    }))
}

// ═══════════════════════════════════════════════════════════════════════════════
// JSON-RPC
// ═══════════════════════════════════════════════════════════════════════════════

pub async fn rpc_handler(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let response = match serde_json::from_slice::<Value>(&body) {
        Ok(value) => dispatch_value(&state.service, value).await,
        Err(e) => {
            let error = PunchError::parse_error(e.to_string());
            serde_json::to_value(RpcResponse::failure(Value::Null, &error)).unwrap_or(Value::Null)
        }
    };
    Json(response)
}
