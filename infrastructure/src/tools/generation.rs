//! Built-in generation handler
//!
//! Turns a tool invocation into one [`GenerationRequest`]: thread history
//! is replayed as context messages, tool-specific arguments are appended to
//! the prompt as a JSON block, and attachments pass through untouched for
//! the provider client to validate and encode.

use async_trait::async_trait;
use gateway_application::{ToolHandler, ToolInvocation, ToolOutput};
use gateway_domain::{ContextMessage, GatewayError, GenerationRequest, ToolDefinition};
use serde_json::{Map, Value};
use tracing::debug;

/// Handler used for every tool without a dedicated one.
#[derive(Debug, Clone, Default)]
pub struct GenerationHandler {
    /// Overrides the instructions derived from the tool definition
    instructions: Option<String>,
}

impl GenerationHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    fn instructions_for(&self, tool: &ToolDefinition) -> String {
        match &self.instructions {
            Some(instructions) => instructions.clone(),
            None => format!(
                "You are answering a request made through the '{}' tool ({}).",
                tool.name, tool.description
            ),
        }
    }
}

/// Prompt text followed by any tool-specific arguments.
fn compose_prompt(prompt: &str, extra: &Map<String, Value>) -> String {
    if extra.is_empty() {
        return prompt.to_string();
    }
    let block = serde_json::to_string_pretty(extra).unwrap_or_default();
    format!("{prompt}\n\nParameters:\n```json\n{block}\n```")
}

#[async_trait]
impl ToolHandler for GenerationHandler {
    async fn handle(&self, invocation: ToolInvocation<'_>) -> Result<ToolOutput, GatewayError> {
        let history: Vec<ContextMessage> = invocation.history().map(ContextMessage::from).collect();
        let arguments = invocation.arguments;

        let request = GenerationRequest::new(compose_prompt(&arguments.prompt, &arguments.extra))
            .with_instructions(self.instructions_for(invocation.tool))
            .with_history(history)
            .with_attachments(invocation.attachments.to_vec())
            .with_temperature(arguments.temperature)
            .with_max_output_tokens(invocation.model.max_output_tokens);

        debug!(
            tool = %invocation.tool.name,
            model = %invocation.model.model_id,
            history = request.history.len(),
            attachments = request.attachments.len(),
            "Generating"
        );

        let output = invocation
            .client
            .generate(invocation.model, &request)
            .await?;

        Ok(ToolOutput {
            text: output.text,
            attachments: Vec::new(),
            usage: output.usage,
            finish_reason: output.finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::default_registry;
    use chrono::Utc;
    use gateway_application::ProviderClient;
    use gateway_domain::{
        ContinuationToken, ConversationTurn, CostClass, FileKind, FileRef, FinishReason,
        GenerationOutput, ModelDescriptor, ProviderId, Role, ThreadContext, ToolArguments,
        UsageStats,
    };
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    struct RecordingClient {
        id: ProviderId,
        seen: Mutex<Option<GenerationRequest>>,
    }

    impl RecordingClient {
        fn new() -> Self {
            Self {
                id: ProviderId::new("openai"),
                seen: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ProviderClient for RecordingClient {
        fn provider_id(&self) -> &ProviderId {
            &self.id
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(5)
        }

        async fn generate(
            &self,
            _model: &ModelDescriptor,
            request: &GenerationRequest,
        ) -> Result<GenerationOutput, GatewayError> {
            *self.seen.lock().unwrap() = Some(request.clone());
            Ok(GenerationOutput::new("answer")
                .with_usage(UsageStats::new(12, 3))
                .with_finish_reason(FinishReason::Length))
        }
    }

    fn turn(index: usize, role: Role, content: &str) -> ConversationTurn {
        ConversationTurn {
            index,
            role,
            content: content.to_string(),
            attached_files: Vec::new(),
            timestamp: Utc::now(),
            model_id: None,
            provider_id: None,
        }
    }

    fn context(turns: Vec<ConversationTurn>) -> ThreadContext {
        ThreadContext {
            token: ContinuationToken::parse("t1").unwrap(),
            tool_name: "chat".to_string(),
            turns,
            dropped: 0,
        }
    }

    #[tokio::test]
    async fn test_builds_request_from_invocation() {
        let registry = default_registry();
        let tool = registry.resolve("codereview").unwrap();
        let model = ModelDescriptor::new("openai", "gpt-4.1", CostClass::Medium, 1_000_000);
        let raw = json!({
            "prompt": "review this",
            "temperature": 0.2,
            "review_type": "security",
        });
        let arguments = ToolArguments::validate(tool, raw.as_object().unwrap()).unwrap();
        let attachments = vec![FileRef {
            host_path: PathBuf::from("/src/lib.rs"),
            sandbox_path: PathBuf::from("/src/lib.rs"),
            kind: FileKind::Code,
        }];
        let context = context(vec![
            turn(0, Role::User, "first question"),
            turn(1, Role::Assistant, "first answer"),
            turn(2, Role::User, "review this"),
        ]);
        let client = RecordingClient::new();

        let output = GenerationHandler::new()
            .handle(ToolInvocation {
                tool,
                model: &model,
                client: &client,
                arguments: &arguments,
                attachments: &attachments,
                context: &context,
                turn_index: 2,
            })
            .await
            .unwrap();

        assert_eq!(output.text, "answer");
        assert_eq!(output.usage, UsageStats::new(12, 3));
        assert_eq!(output.finish_reason, FinishReason::Length);

        let request = client.seen.lock().unwrap().clone().unwrap();
        // The current user turn is the prompt, not history
        assert_eq!(request.history.len(), 2);
        assert_eq!(request.history[1].role, Role::Assistant);
        assert!(request.prompt.starts_with("review this"));
        assert!(request.prompt.contains("\"review_type\": \"security\""));
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.attachments, attachments);
        assert!(request.instructions.unwrap().contains("'codereview'"));
    }

    #[tokio::test]
    async fn test_custom_instructions() {
        let registry = default_registry();
        let tool = registry.resolve("chat").unwrap();
        let model = ModelDescriptor::new("openai", "gpt-4.1", CostClass::Medium, 1_000_000);
        let raw = json!({"prompt": "hi"});
        let arguments = ToolArguments::validate(tool, raw.as_object().unwrap()).unwrap();
        let context = context(vec![turn(0, Role::User, "hi")]);
        let client = RecordingClient::new();

        GenerationHandler::new()
            .with_instructions("Be brief.")
            .handle(ToolInvocation {
                tool,
                model: &model,
                client: &client,
                arguments: &arguments,
                attachments: &[],
                context: &context,
                turn_index: 0,
            })
            .await
            .unwrap();

        let request = client.seen.lock().unwrap().clone().unwrap();
        assert_eq!(request.instructions.as_deref(), Some("Be brief."));
        assert_eq!(request.prompt, "hi");
        assert!(request.history.is_empty());
    }

    #[test]
    fn test_compose_prompt_without_extras() {
        assert_eq!(compose_prompt("plain", &Map::new()), "plain");
    }
}
