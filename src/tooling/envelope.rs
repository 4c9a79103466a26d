use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2025-06-18";

#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    /// True when this envelope answers the request with the given id.
    pub fn answers(&self, request_id: u64) -> bool {
        self.id
            .as_ref()
            .and_then(Value::as_u64)
            .is_some_and(|id| id == request_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    #[serde(default = "default_error_code")]
    pub code: i64,
    pub message: String,
}

fn default_error_code() -> i64 {
    -32000
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_with_version() {
        let request = RpcRequest::new(7, "tools/list", json!({}));
        let encoded = serde_json::to_value(&request).expect("serializable");
        assert_eq!(encoded["jsonrpc"], "2.0");
        assert_eq!(encoded["id"], 7);
        assert_eq!(encoded["method"], "tools/list");
    }

    #[test]
    fn response_matches_request_id() {
        let response: RpcResponse =
            serde_json::from_value(json!({ "jsonrpc": "2.0", "id": 3, "result": {} }))
                .expect("valid response");
        assert!(response.answers(3));
        assert!(!response.answers(4));
    }

    #[test]
    fn error_code_defaults_when_absent() {
        let response: RpcResponse = serde_json::from_value(
            json!({ "jsonrpc": "2.0", "id": 1, "error": { "message": "boom" } }),
        )
        .expect("valid response");
        let error = response.error.expect("error present");
        assert_eq!(error.code, -32000);
        assert_eq!(error.message, "boom");
    }
}
