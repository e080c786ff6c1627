//! JSON-RPC 2.0 message types for the stdio transport.
//!
//! - **Requests**: caller → gateway, carry an `id` and expect one response
//! - **Notifications**: caller → gateway, no `id`, never answered
//! - **Responses**: gateway → caller, either `result` or `error`

use gateway_domain::{ContinuationToken, ErrorKind, GatewayError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const JSONRPC_VERSION: &str = "2.0";

/// Standard and gateway-specific error codes.
pub mod codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    pub const UNKNOWN_TOOL: i64 = -32001;
    pub const MODEL_NOT_FOUND: i64 = -32002;
    pub const NO_AVAILABLE_MODEL: i64 = -32003;
    pub const PROVIDER_ERROR: i64 = -32004;
    pub const INVALID_ATTACHMENT: i64 = -32005;
    pub const THREAD_NOT_FOUND: i64 = -32006;
    pub const THREAD_FULL: i64 = -32007;
    pub const PATH_OUTSIDE_WORKSPACE: i64 = -32008;
    pub const PATH_TRAVERSAL: i64 = -32009;
    pub const CANCELLED: i64 = -32010;
}

/// Incoming frame, before classification.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcMessage {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Error object for a gateway failure; `data` names the category so
    /// callers need not parse the message.
    pub fn from_gateway(error: &GatewayError, continuation_id: Option<&ContinuationToken>) -> Self {
        let kind = error.kind();
        let mut data = json!({ "kind": kind.as_str() });
        if matches!(error, GatewayError::Provider { .. }) {
            data["transient"] = json!(error.is_transient());
        }
        if let Some(token) = continuation_id {
            data["continuation_id"] = json!(token.as_str());
        }
        Self {
            code: error_code(kind),
            message: error.to_string(),
            data: Some(data),
        }
    }
}

/// JSON-RPC response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    /// `null` when the request id could not be determined
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// One frame, without the trailing newline.
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"jsonrpc":"2.0","id":null,"error":{{"code":{},"message":"failed to encode response: {}"}}}}"#,
                codes::INTERNAL_ERROR,
                e
            )
        })
    }
}

/// Error code for each category.
pub fn error_code(kind: ErrorKind) -> i64 {
    match kind {
        ErrorKind::Protocol => codes::INVALID_REQUEST,
        ErrorKind::Argument => codes::INVALID_PARAMS,
        ErrorKind::UnknownTool => codes::UNKNOWN_TOOL,
        ErrorKind::ModelNotFound => codes::MODEL_NOT_FOUND,
        ErrorKind::NoAvailableModel => codes::NO_AVAILABLE_MODEL,
        ErrorKind::Provider => codes::PROVIDER_ERROR,
        ErrorKind::InvalidAttachment => codes::INVALID_ATTACHMENT,
        ErrorKind::ThreadNotFound => codes::THREAD_NOT_FOUND,
        ErrorKind::ThreadFull => codes::THREAD_FULL,
        ErrorKind::PathOutsideWorkspace => codes::PATH_OUTSIDE_WORKSPACE,
        ErrorKind::PathTraversal => codes::PATH_TRAVERSAL,
        ErrorKind::Storage => codes::INTERNAL_ERROR,
        ErrorKind::Cancelled => codes::CANCELLED,
    }
}

/// Key identifying a request id in maps, e.g. for cancellation.
pub fn id_key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
