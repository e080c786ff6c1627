//! Stream transport front end.
//!
//! Classifies one newline-delimited JSON-RPC frame into a [`Frame`]. Tool
//! calls come in two equivalent shapes:
//!
//! - canonical: `{"method": "chat", "params": {"prompt": "..."}}`
//! - MCP-style: `{"method": "tools/call", "params": {"name": "chat", "arguments": {...}}}`
//!
//! Both produce the same [`ToolRequest`].

use super::jsonrpc::{JSONRPC_VERSION, JsonRpcMessage, RpcError, codes, id_key};
use gateway_domain::{
    ContinuationToken, GatewayError, RequestId, ToolRegistry, ToolRequest, TransportKind, params,
};
use serde_json::{Map, Value};

pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
    pub const MODELS_LIST: &str = "models/list";
    pub const THREADS_CLOSE: &str = "threads/close";
    pub const INITIALIZED: &str = "notifications/initialized";
    pub const CANCELLED: &str = "notifications/cancelled";
}

/// How a tool call was addressed; decides the result shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStyle {
    /// Method name is the tool name
    Canonical,
    /// `tools/call`
    Mcp,
}

/// A request that expects a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Tool { request: ToolRequest, style: CallStyle },
    ListTools,
    ListModels,
    CloseThread(ContinuationToken),
    Initialize { protocol_version: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Initialized,
    /// Abort the request with this id, if still running
    Cancelled { request_id: Value },
    /// Any other notification; ignored
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Request { id: Value, call: Call },
    Notification(Notification),
}

/// A frame that could not be accepted, answered with `id` (or `null`).
#[derive(Debug, Clone, PartialEq)]
pub struct FrameError {
    pub id: Value,
    pub error: RpcError,
}

impl FrameError {
    fn new(id: Option<&Value>, code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = if code == codes::INVALID_PARAMS {
            "argument_error"
        } else {
            "protocol_error"
        };
        Self {
            id: id.cloned().unwrap_or(Value::Null),
            error: RpcError {
                code,
                message,
                data: Some(serde_json::json!({ "kind": kind })),
            },
        }
    }

    fn from_gateway(id: &Value, error: &GatewayError) -> Self {
        Self {
            id: id.clone(),
            error: RpcError::from_gateway(error, None),
        }
    }
}

/// Parse and classify one line.
pub fn parse_frame(line: &str, registry: &ToolRegistry) -> Result<Frame, FrameError> {
    let value: Value = serde_json::from_str(line)
        .map_err(|e| FrameError::new(None, codes::PARSE_ERROR, format!("Parse error: {e}")))?;
    if !value.is_object() {
        return Err(FrameError::new(
            None,
            codes::INVALID_REQUEST,
            "Invalid request: frame must be a JSON object",
        ));
    }
    let message: JsonRpcMessage = serde_json::from_value(value).map_err(|e| {
        FrameError::new(None, codes::INVALID_REQUEST, format!("Invalid request: {e}"))
    })?;

    if let Some(version) = &message.jsonrpc
        && version != JSONRPC_VERSION
    {
        return Err(FrameError::new(
            message.id.as_ref(),
            codes::INVALID_REQUEST,
            format!("Invalid request: unsupported jsonrpc version '{version}'"),
        ));
    }
    let Some(method) = message.method.as_deref() else {
        return Err(FrameError::new(
            message.id.as_ref(),
            codes::INVALID_REQUEST,
            "Invalid request: missing method",
        ));
    };

    match message.id {
        None => Ok(Frame::Notification(parse_notification(method, message.params))),
        Some(id) => {
            let call = parse_call(method, message.params, &id, registry)?;
            Ok(Frame::Request { id, call })
        }
    }
}

fn parse_notification(method: &str, params: Option<Value>) -> Notification {
    match method {
        methods::INITIALIZED => Notification::Initialized,
        methods::CANCELLED => match params.and_then(|p| p.get("requestId").cloned()) {
            Some(request_id) => Notification::Cancelled { request_id },
            None => Notification::Other(method.to_string()),
        },
        other => Notification::Other(other.to_string()),
    }
}

fn parse_call(
    method: &str,
    params: Option<Value>,
    id: &Value,
    registry: &ToolRegistry,
) -> Result<Call, FrameError> {
    match method {
        methods::INITIALIZE => Ok(Call::Initialize {
            protocol_version: params
                .as_ref()
                .and_then(|p| p.get("protocolVersion"))
                .and_then(Value::as_str)
                .map(str::to_string),
        }),
        methods::TOOLS_LIST => Ok(Call::ListTools),
        methods::MODELS_LIST => Ok(Call::ListModels),
        methods::THREADS_CLOSE => {
            let params = params_object(params, id)?;
            let raw = params
                .get(params::CONTINUATION_ID)
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    FrameError::new(
                        Some(id),
                        codes::INVALID_PARAMS,
                        "Invalid arguments: missing required parameter 'continuation_id'",
                    )
                })?;
            let token =
                ContinuationToken::parse(raw).map_err(|e| FrameError::from_gateway(id, &e))?;
            Ok(Call::CloseThread(token))
        }
        methods::TOOLS_CALL => {
            let mut params = params_object(params, id)?;
            let name = match params.remove("name") {
                Some(Value::String(name)) => name,
                _ => {
                    return Err(FrameError::new(
                        Some(id),
                        codes::INVALID_PARAMS,
                        "Invalid arguments: tools/call requires a string 'name'",
                    ));
                }
            };
            let arguments = params_object(params.remove("arguments"), id)?;
            Ok(Call::Tool {
                request: tool_request(name, arguments, id),
                style: CallStyle::Mcp,
            })
        }
        tool if registry.contains(tool) => Ok(Call::Tool {
            request: tool_request(tool.to_string(), params_object(params, id)?, id),
            style: CallStyle::Canonical,
        }),
        unknown => Err(FrameError::new(
            Some(id),
            codes::METHOD_NOT_FOUND,
            format!("Method not found: {unknown}"),
        )),
    }
}

/// `params` as an argument mapping; absent means empty.
fn params_object(params: Option<Value>, id: &Value) -> Result<Map<String, Value>, FrameError> {
    match params {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(FrameError::new(
            Some(id),
            codes::INVALID_PARAMS,
            "Invalid arguments: params must be an object",
        )),
    }
}

fn tool_request(name: String, arguments: Map<String, Value>, id: &Value) -> ToolRequest {
    ToolRequest::new(
        name,
        arguments,
        TransportKind::Stream,
        RequestId::new(id_key(id)),
    )
}
