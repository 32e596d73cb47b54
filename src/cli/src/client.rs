//! JSON-RPC client for the Punchclock server.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

use punchclock_core::api::{RpcRequest, RpcResponse};

/// HTTP client for the Punchclock API.
pub struct ApiClient {
    client: Client,
    base_url: String,
    next_id: AtomicU64,
}

impl ApiClient {
    /// Create a new API client pointing at the given base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Return the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call a JSON-RPC method and deserialize its result.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let url = format!("{}/rpc", self.base_url);
        let request = RpcRequest::new(method, params, self.next_id.fetch_add(1, Ordering::Relaxed));

        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("POST {} failed", url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        let rpc_resp: RpcResponse = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))?;

        if let Some(error) = rpc_resp.error {
            anyhow::bail!("{} ({})", error.message, error.data.error_code);
        }

        serde_json::from_value(rpc_resp.result.unwrap_or(Value::Null))
            .with_context(|| format!("Unexpected result for '{}'", method))
    }

    /// Perform a raw GET request and return the full JSON value (for health endpoint).
    pub async fn get_raw(&self, path: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}
