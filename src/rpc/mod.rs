//! Remote calls into the ERP backend
//!
//! Every data operation goes through [`OrmService::call`], keyed by model
//! name + method name with positional and keyword arguments.

pub mod json_rpc;

pub use json_rpc::JsonRpcClient;

use serde_json::{Map, Value};
use std::future::Future;

/// Error type for remote calls
#[derive(Debug, Clone, PartialEq)]
pub enum RpcError {
    /// Transport failure (connection, timeout, TLS)
    NetworkError(String),
    /// Response could not be parsed into the expected shape
    JsonError(String),
    /// The server rejected the call (HTTP status or JSON-RPC error object)
    ServerError { code: i64, message: String },
    /// The method returned an `{error}` payload
    Remote(String),
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RpcError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            RpcError::JsonError(msg) => write!(f, "JSON error: {}", msg),
            RpcError::ServerError { code, message } => {
                write!(f, "Server error ({}): {}", code, message)
            }
            RpcError::Remote(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for RpcError {}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::JsonError(err.to_string())
    }
}

impl RpcError {
    /// Human-readable text supplied by the backend, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            RpcError::ServerError { message, .. } | RpcError::Remote(message)
                if !message.trim().is_empty() =>
            {
                Some(message)
            }
            _ => None,
        }
    }
}

/// Request/response channel to the backend's model methods
pub trait OrmService {
    fn call(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> impl Future<Output = Result<Value, RpcError>>;
}

/// Turns an `{"error": "..."}` result payload into [`RpcError::Remote`]
pub fn reject_error_payload(value: Value) -> Result<Value, RpcError> {
    match value.get("error") {
        Some(Value::String(msg)) => Err(RpcError::Remote(msg.clone())),
        Some(Value::Null) | Some(Value::Bool(false)) | None => Ok(value),
        Some(other) => Err(RpcError::Remote(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reject_error_payload() {
        let ok = json!({"lot_name": "L1", "photos": []});
        assert_eq!(reject_error_payload(ok.clone()), Ok(ok));

        let err = json!({"error": "Lot not found"});
        assert_eq!(
            reject_error_payload(err),
            Err(RpcError::Remote("Lot not found".to_string()))
        );

        let save_ok = json!({"success": true, "error": false});
        assert!(reject_error_payload(save_ok).is_ok());
    }

    #[test]
    fn test_server_message() {
        let remote = RpcError::Remote("No stock".to_string());
        assert_eq!(remote.server_message(), Some("No stock"));

        let blank = RpcError::ServerError {
            code: 200,
            message: "  ".to_string(),
        };
        assert_eq!(blank.server_message(), None);
        assert_eq!(RpcError::NetworkError("timeout".into()).server_message(), None);
    }
}
