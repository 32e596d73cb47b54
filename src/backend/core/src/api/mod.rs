//! API layer for Punchclock Core.
//!
//! A thin JSON-RPC 2.0 over HTTP adapter in front of [`ClockService`]:
//!
//! - `POST /rpc`: JSON-RPC requests (single or batch)
//! - `GET /health`: liveness and store summary

mod handlers;
pub mod rpc;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::service::ClockService;

pub use rpc::{dispatch, RpcError, RpcErrorData, RpcRequest, RpcResponse, JSONRPC_VERSION};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClockService>,
}

impl AppState {
    pub fn new(service: Arc<ClockService>) -> Self {
        Self { service }
    }
}

/// Build the API router.
///
/// # Example
///
/// ```rust,ignore
/// let app = build_router(AppState::new(service));
/// ```
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/rpc", post(handlers::rpc_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
