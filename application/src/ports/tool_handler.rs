//! Tool handler port
//!
//! A handler turns a routed, validated invocation into model output. The
//! gateway ships one generic generation handler; tools with bespoke
//! behavior register their own.

use super::provider_client::ProviderClient;
use async_trait::async_trait;
use gateway_domain::{
    FileRef, FinishReason, GatewayError, ModelDescriptor, ThreadContext, ToolArguments,
    ToolDefinition, UsageStats,
};

/// Everything a handler needs for one attempt.
pub struct ToolInvocation<'a> {
    pub tool: &'a ToolDefinition,
    pub model: &'a ModelDescriptor,
    pub client: &'a dyn ProviderClient,
    pub arguments: &'a ToolArguments,
    /// Translated files and images
    pub attachments: &'a [FileRef],
    /// Thread history, including the current user turn at `turn_index`
    pub context: &'a ThreadContext,
    pub turn_index: usize,
}

impl ToolInvocation<'_> {
    /// Context turns that precede the current request.
    pub fn history(&self) -> impl Iterator<Item = &gateway_domain::ConversationTurn> {
        self.context
            .turns
            .iter()
            .filter(move |turn| turn.index < self.turn_index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    pub attachments: Vec<FileRef>,
    pub usage: UsageStats,
    pub finish_reason: FinishReason,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
            usage: UsageStats::default(),
            finish_reason: FinishReason::Stop,
        }
    }
}

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, invocation: ToolInvocation<'_>) -> Result<ToolOutput, GatewayError>;
}
