//! JSON-RPC 2.0 envelope and method dispatch.
//!
//! Methods: `start`, `stop`, `finish`, `rewrite`, `list`, `current`, `history`.
//! Params may be named (`{"id": "work"}`) or positional (`["work"]`).

use metrics::counter;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::{ErrorCode, ErrorDetails, PunchError, Result};
use crate::events::{EventKind, TimedEvent, Timestamp};
use crate::service::ClockService;

pub const JSONRPC_VERSION: &str = "2.0";

// ═══════════════════════════════════════════════════════════════════════════════
// Envelope
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Value, id: impl Into<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Value,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(id: Value, error: &PunchError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(RpcError::from(error)),
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    pub data: RpcErrorData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorData {
    pub error_code: ErrorCode,
    #[serde(default)]
    pub details: ErrorDetails,
}

impl From<&PunchError> for RpcError {
    fn from(error: &PunchError) -> Self {
        Self {
            code: error.code().numeric_code(),
            message: error.message().to_string(),
            data: RpcErrorData {
                error_code: error.code(),
                details: error.details().clone(),
            },
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Params
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct IdParams {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RewriteParams {
    id: String,
    events: Vec<RewriteEvent>,
}

/// A rewrite event as sent on the wire. The kind stays a string until
/// `EventKind::from_str` so an unknown kind reports `INVALID_EVENT_KIND`.
#[derive(Debug, Deserialize)]
struct RewriteEvent {
    event: String,
    timestamp: Timestamp,
}

impl RewriteEvent {
    fn into_timed(self) -> Result<TimedEvent> {
        Ok(TimedEvent::new(self.event.parse::<EventKind>()?, self.timestamp))
    }
}

/// Decode params, mapping positional arrays onto `names` in order.
fn parse_params<T: DeserializeOwned>(params: Value, names: &[&str]) -> Result<T> {
    let params = match params {
        Value::Array(values) => {
            if values.len() > names.len() {
                return Err(PunchError::invalid_params(format!(
                    "expected at most {} positional params, got {}",
                    names.len(),
                    values.len()
                )));
            }
            Value::Object(
                names
                    .iter()
                    .map(|name| name.to_string())
                    .zip(values)
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Null => Value::Object(Map::new()),
        other => other,
    };

    serde_json::from_value(params).map_err(|e| PunchError::invalid_params(e.to_string()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Dispatch
// ═══════════════════════════════════════════════════════════════════════════════

async fn call(service: &ClockService, method: &str, params: Value) -> Result<Value> {
    match method {
        "start" => {
            let p: IdParams = parse_params(params, &["id"])?;
            service.start(&p.id).await?;
            Ok(Value::Null)
        }
        "stop" => {
            let p: IdParams = parse_params(params, &["id"])?;
            service.stop(&p.id).await?;
            Ok(Value::Null)
        }
        "finish" => {
            let p: IdParams = parse_params(params, &["id"])?;
            Ok(json!(service.finish(&p.id).await?))
        }
        "rewrite" => {
            let p: RewriteParams = parse_params(params, &["id", "events"])?;
            let events = p
                .events
                .into_iter()
                .map(RewriteEvent::into_timed)
                .collect::<Result<Vec<_>>>()?;
            service.rewrite(&p.id, events).await?;
            Ok(Value::Null)
        }
        "list" => Ok(serde_json::to_value(service.list().await?)?),
        "current" => Ok(json!(service.current().await)),
        "history" => {
            let p: IdParams = parse_params(params, &["id"])?;
            Ok(serde_json::to_value(service.history(&p.id).await?)?)
        }
        other => Err(PunchError::method_not_found(other)),
    }
}

/// Handle one request. Core failures become error responses.
pub async fn dispatch(service: &ClockService, request: RpcRequest) -> RpcResponse {
    if request.jsonrpc != JSONRPC_VERSION {
        let error = PunchError::invalid_request(format!(
            "Unsupported jsonrpc version '{}'",
            request.jsonrpc
        ));
        return RpcResponse::failure(request.id, &error);
    }

    counter!("punchclock_rpc_requests_total", "method" => request.method.clone()).increment(1);

    match call(service, &request.method, request.params).await {
        Ok(result) => RpcResponse::success(request.id, result),
        Err(error) => {
            debug!(method = %request.method, code = %error.code(), "RPC call failed");
            RpcResponse::failure(request.id, &error)
        }
    }
}

/// Handle a decoded request body: a single request or a batch.
pub async fn dispatch_value(service: &ClockService, body: Value) -> Value {
    match body {
        Value::Array(batch) if batch.is_empty() => {
            to_value(&RpcResponse::failure(Value::Null, &PunchError::invalid_request("Empty batch")))
        }
        Value::Array(batch) => {
            let mut responses = Vec::with_capacity(batch.len());
            for item in batch {
                responses.push(dispatch_single(service, item).await);
            }
            to_value(&responses)
        }
        single => to_value(&dispatch_single(service, single).await),
    }
}

async fn dispatch_single(service: &ClockService, body: Value) -> RpcResponse {
    let id = body.get("id").cloned().unwrap_or(Value::Null);
    match serde_json::from_value::<RpcRequest>(body) {
        Ok(request) => dispatch(service, request).await,
        Err(e) => RpcResponse::failure(id, &PunchError::invalid_request(e.to_string())),
    }
}

fn to_value<T: Serialize>(response: &T) -> Value {
    serde_json::to_value(response).unwrap_or(Value::Null)
}
