use super::{OrmService, RpcError};
use crate::config::RpcConfig;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// Odoo-style JSON-RPC envelope returned by `/web/dataset/call_kw`
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<JsonRpcErrorData>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorData {
    #[serde(default)]
    message: Option<String>,
}

impl JsonRpcResponse {
    fn into_result(self) -> Result<Value, RpcError> {
        if let Some(error) = self.error {
            // data.message carries the UserError text shown to users
            let message = error
                .data
                .and_then(|d| d.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(error.message);
            return Err(RpcError::ServerError {
                code: error.code,
                message,
            });
        }
        Ok(self.result.unwrap_or(Value::Null))
    }
}

/// JSON-RPC client for the ERP web endpoint
pub struct JsonRpcClient {
    base_url: String,
    session_id: Option<String>,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl std::fmt::Debug for JsonRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("base_url", &self.base_url)
            .field("has_session", &self.session_id.is_some())
            .finish()
    }
}

impl JsonRpcClient {
    pub fn new(config: &RpcConfig) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .user_agent(concat!("InventoryVisual/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RpcError::NetworkError(format!("Client build failed: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session_id: config.session_id.clone(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/web/dataset/call_kw/{}/{}", self.base_url, model, method)
    }
}

fn request_body(id: u64, model: &str, method: &str, args: Vec<Value>, kwargs: Map<String, Value>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "call",
        "id": id,
        "params": {
            "model": model,
            "method": method,
            "args": args,
            "kwargs": kwargs,
        }
    })
}

impl OrmService for JsonRpcClient {
    async fn call(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let url = self.endpoint(model, method);
        log::debug!("RPC #{} {}.{}", id, model, method);

        let mut request = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&request_body(id, model, method, args, kwargs));
        if let Some(session_id) = &self.session_id {
            request = request.header(reqwest::header::COOKIE, format!("session_id={}", session_id));
        }

        let response = request
            .send()
            .await
            .map_err(|e| RpcError::NetworkError(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            log::error!("RPC {}.{} returned status {}", model, method, status);
            return Err(RpcError::ServerError {
                code: status.as_u16() as i64,
                message: format!("Server returned status: {}", status),
            });
        }

        let envelope = response
            .json::<JsonRpcResponse>()
            .await
            .map_err(|e| RpcError::JsonError(format!("Failed to parse response: {}", e)))?;

        envelope.into_result().inspect_err(|e| {
            log::error!("RPC {}.{} failed: {}", model, method, e);
        })
    }
}
