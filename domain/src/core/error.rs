//! Domain error types
//!
//! [`GatewayError`] is the single error taxonomy shared by every layer.
//! Each variant maps to one [`ErrorKind`], which the front end turns into a
//! JSON-RPC error code or a process exit code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether a provider failure may succeed on another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureClass {
    /// Timeouts, rate limits, upstream 5xx.
    Transient,
    /// Bad credentials, policy rejections, malformed requests.
    Permanent,
}

impl FailureClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureClass::Transient => "transient",
            FailureClass::Permanent => "permanent",
        }
    }
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error category, one per [`GatewayError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Protocol,
    Argument,
    UnknownTool,
    ModelNotFound,
    NoAvailableModel,
    Provider,
    InvalidAttachment,
    ThreadNotFound,
    ThreadFull,
    PathOutsideWorkspace,
    PathTraversal,
    Storage,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Protocol => "protocol_error",
            ErrorKind::Argument => "argument_error",
            ErrorKind::UnknownTool => "unknown_tool",
            ErrorKind::ModelNotFound => "model_not_found",
            ErrorKind::NoAvailableModel => "no_available_model",
            ErrorKind::Provider => "provider_error",
            ErrorKind::InvalidAttachment => "invalid_attachment",
            ErrorKind::ThreadNotFound => "thread_not_found",
            ErrorKind::ThreadFull => "thread_full",
            ErrorKind::PathOutsideWorkspace => "path_outside_workspace",
            ErrorKind::PathTraversal => "path_traversal",
            ErrorKind::Storage => "storage_error",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gateway-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid arguments: {0}")]
    Argument(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("No available model: {0}")]
    NoAvailableModel(String),

    #[error("Provider '{provider}' failed ({class}): {message}")]
    Provider {
        provider: String,
        class: FailureClass,
        message: String,
    },

    #[error("Invalid attachment '{path}': {reason}")]
    InvalidAttachment { path: String, reason: String },

    #[error("Conversation thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Conversation thread '{token}' reached its limit of {max_turns} turns")]
    ThreadFull { token: String, max_turns: usize },

    #[error("Path is outside every mounted workspace: {0}")]
    PathOutsideWorkspace(String),

    #[error("Path escapes its workspace root: {0}")]
    PathTraversal(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl GatewayError {
    pub fn transient(provider: impl Into<String>, message: impl Into<String>) -> Self {
        GatewayError::Provider {
            provider: provider.into(),
            class: FailureClass::Transient,
            message: message.into(),
        }
    }

    pub fn permanent(provider: impl Into<String>, message: impl Into<String>) -> Self {
        GatewayError::Provider {
            provider: provider.into(),
            class: FailureClass::Permanent,
            message: message.into(),
        }
    }

    pub fn invalid_attachment(path: impl Into<String>, reason: impl Into<String>) -> Self {
        GatewayError::InvalidAttachment {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Protocol(_) => ErrorKind::Protocol,
            GatewayError::Argument(_) => ErrorKind::Argument,
            GatewayError::UnknownTool(_) => ErrorKind::UnknownTool,
            GatewayError::ModelNotFound(_) => ErrorKind::ModelNotFound,
            GatewayError::NoAvailableModel(_) => ErrorKind::NoAvailableModel,
            GatewayError::Provider { .. } => ErrorKind::Provider,
            GatewayError::InvalidAttachment { .. } => ErrorKind::InvalidAttachment,
            GatewayError::ThreadNotFound(_) => ErrorKind::ThreadNotFound,
            GatewayError::ThreadFull { .. } => ErrorKind::ThreadFull,
            GatewayError::PathOutsideWorkspace(_) => ErrorKind::PathOutsideWorkspace,
            GatewayError::PathTraversal(_) => ErrorKind::PathTraversal,
            GatewayError::Storage(_) => ErrorKind::Storage,
            GatewayError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Only transient provider failures are retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::Provider {
                class: FailureClass::Transient,
                ..
            }
        )
    }

    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GatewayError::Cancelled)
    }
}
