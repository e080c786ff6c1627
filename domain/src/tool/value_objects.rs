//! Canonical request and response shapes shared by both transports.

use crate::conversation::ContinuationToken;
use crate::generation::{FinishReason, UsageStats};
use crate::workspace::FileRef;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Entry transport a request arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Stream,
    Cli,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Stream => "stream",
            TransportKind::Cli => "cli",
        }
    }
}

/// Request identifier, unique per transport session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tool invocation, independent of the transport it arrived on.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolRequest {
    pub tool_name: String,
    pub arguments: Map<String, Value>,
    pub transport: TransportKind,
    pub request_id: RequestId,
}

impl ToolRequest {
    pub fn new(
        tool_name: impl Into<String>,
        arguments: Map<String, Value>,
        transport: TransportKind,
        request_id: RequestId,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
            transport,
            request_id,
        }
    }
}

/// Successful result of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub tool_name: String,
    pub content: String,
    pub continuation_id: ContinuationToken,
    pub provider_id: String,
    pub model_id: String,
    pub usage: UsageStats,
    pub finish_reason: FinishReason,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<FileRef>,
    /// Oldest turns left out of the replayed history
    #[serde(default, skip_serializing_if = "is_zero")]
    pub dropped_turns: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}
