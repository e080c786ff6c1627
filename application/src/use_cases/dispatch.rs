//! Execution Dispatcher use case.
//!
//! Runs one tool request end to end:
//!
//! 1. Resolve the [`ToolDefinition`] and validate the arguments
//! 2. Route to an ordered list of candidate models
//! 3. Translate file and image paths into sandbox paths
//! 4. Create the thread, or append the user turn to the continued one
//! 5. Invoke the tool handler with this request's files plus those of
//!    earlier turns still in context, retrying transient provider failures
//!    on the next candidate with backoff
//! 6. Record the assistant turn and build the [`ToolResponse`]
//!
//! Any failure short-circuits with the originating error. A thread created
//! before the failure is kept, and its token is reported with the error.

use crate::config::RetryPolicy;
use crate::ports::request_logger::{NoRequestLogger, RequestEvent, RequestLogger};
use crate::ports::tool_handler::{ToolHandler, ToolInvocation};
use crate::use_cases::conversation::ConversationManager;
use crate::use_cases::model_router::{ModelAvailability, ModelRouter, Route};
use gateway_domain::util::preview;
use gateway_domain::{
    Capability, ContinuationToken, FileKind, FileRef, GatewayError, ModelDescriptor, NewTurn,
    PathTranslator, ThreadContext, ToolArguments, ToolDefinition, ToolRegistry, ToolRequest,
    ToolResponse,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A failed dispatch, with the thread it touched if any.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{error}")]
pub struct DispatchError {
    pub error: GatewayError,
    pub continuation_id: Option<ContinuationToken>,
}

impl From<GatewayError> for DispatchError {
    fn from(error: GatewayError) -> Self {
        Self {
            error,
            continuation_id: None,
        }
    }
}

pub struct ExecutionDispatcher {
    registry: Arc<ToolRegistry>,
    router: Arc<ModelRouter>,
    conversations: Arc<ConversationManager>,
    translator: Arc<PathTranslator>,
    default_handler: Arc<dyn ToolHandler>,
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
    retry: RetryPolicy,
    request_logger: Arc<dyn RequestLogger>,
}

impl ExecutionDispatcher {
    pub fn new(
        registry: Arc<ToolRegistry>,
        router: Arc<ModelRouter>,
        conversations: Arc<ConversationManager>,
        translator: Arc<PathTranslator>,
        default_handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            registry,
            router,
            conversations,
            translator,
            default_handler,
            handlers: HashMap::new(),
            retry: RetryPolicy::default(),
            request_logger: Arc::new(NoRequestLogger),
        }
    }

    /// Use a dedicated handler for one tool.
    pub fn with_handler(mut self, tool_name: impl Into<String>, handler: Arc<dyn ToolHandler>) -> Self {
        self.handlers.insert(tool_name.into(), handler);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Create with a request logger.
    pub fn with_request_logger(mut self, logger: Arc<dyn RequestLogger>) -> Self {
        self.request_logger = logger;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.registry.list().cloned().collect()
    }

    pub fn list_models(&self) -> Vec<ModelAvailability> {
        self.router.availability()
    }

    pub async fn close_thread(&self, token: &ContinuationToken) -> Result<bool, GatewayError> {
        self.conversations.close_thread(token).await
    }

    /// Execute one request. Cancelling `cancel` aborts the in-flight provider
    /// call; turns already recorded stay.
    pub async fn dispatch(
        &self,
        request: &ToolRequest,
        cancel: &CancellationToken,
    ) -> Result<ToolResponse, DispatchError> {
        let started = Instant::now();
        let mut thread_token: Option<ContinuationToken> = None;

        let result = self.run(request, cancel, &mut thread_token).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => {
                info!(
                    request_id = %request.request_id,
                    tool = %request.tool_name,
                    model = %response.model_id,
                    duration_ms = elapsed_ms,
                    "Tool request completed"
                );
                self.request_logger.log(RequestEvent::new(
                    "tool_completed",
                    json!({
                        "request_id": request.request_id.as_str(),
                        "transport": request.transport.as_str(),
                        "tool": request.tool_name,
                        "provider": response.provider_id,
                        "model": response.model_id,
                        "continuation_id": response.continuation_id.as_str(),
                        "input_tokens": response.usage.input_tokens,
                        "output_tokens": response.usage.output_tokens,
                        "response_bytes": response.content.len(),
                        "duration_ms": elapsed_ms,
                    }),
                ));
            }
            Err(e) => {
                warn!(
                    request_id = %request.request_id,
                    tool = %request.tool_name,
                    kind = %e.kind(),
                    duration_ms = elapsed_ms,
                    "Tool request failed: {}",
                    e
                );
                self.request_logger.log(RequestEvent::new(
                    "tool_failed",
                    json!({
                        "request_id": request.request_id.as_str(),
                        "transport": request.transport.as_str(),
                        "tool": request.tool_name,
                        "error_kind": e.kind().as_str(),
                        "error": e.to_string(),
                        "continuation_id": thread_token.as_ref().map(|t| t.as_str()),
                        "duration_ms": elapsed_ms,
                    }),
                ));
            }
        }

        result.map_err(|error| DispatchError {
            error,
            continuation_id: thread_token,
        })
    }

    async fn run(
        &self,
        request: &ToolRequest,
        cancel: &CancellationToken,
        thread_token: &mut Option<ContinuationToken>,
    ) -> Result<ToolResponse, GatewayError> {
        let tool = self.registry.resolve(&request.tool_name)?;
        let arguments = ToolArguments::validate(tool, &request.arguments)?;
        debug!(
            request_id = %request.request_id,
            tool = %tool.name,
            prompt = %preview(&arguments.prompt, 80),
            "Dispatching tool request"
        );

        // A continued thread must exist before anything else happens.
        let prior = match &arguments.continuation_id {
            Some(token) => {
                let thread = self.conversations.get_thread(token).await?;
                *thread_token = Some(token.clone());
                // Room for this request's user turn and the reply.
                let max_turns = self.conversations.config().max_turns;
                if thread.turns.len() + 2 > max_turns {
                    return Err(GatewayError::ThreadFull {
                        token: token.to_string(),
                        max_turns,
                    });
                }
                Some(thread)
            }
            None => None,
        };

        let inherited = prior
            .as_ref()
            .and_then(|t| t.last_assistant_model())
            .map(|(p, m)| (p.to_string(), m.to_string()));
        let candidates = self.router.candidates(
            &tool.required_capabilities,
            &arguments.model,
            inherited.as_ref().map(|(p, m)| (p.as_str(), m.as_str())),
        )?;

        let mut attachments: Vec<FileRef> = self.translator.translate_all(&arguments.files)?;
        attachments.extend(self.translator.translate_all(&arguments.images)?);

        let user_turn = NewTurn::user(arguments.prompt.clone()).with_files(attachments.clone());
        let (token, turn_index) = match &arguments.continuation_id {
            Some(token) => {
                let turn = self.conversations.append_turn(token, user_turn).await?;
                (token.clone(), turn.index)
            }
            None => {
                let thread = self.conversations.create_thread(&tool.name, user_turn).await?;
                *thread_token = Some(thread.token.clone());
                (thread.token, 0)
            }
        };

        let handler = self
            .handlers
            .get(&tool.name)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.default_handler));

        let attempts = self.retry.max_attempts.max(1);
        let mut last_error: Option<GatewayError> = None;

        for attempt in 0..attempts {
            let route: &Route = &candidates[attempt % candidates.len()];
            let delay = self.retry.delay_for(attempt);
            if !delay.is_zero() {
                debug!(attempt, delay_ms = delay.as_millis() as u64, "Backing off before retry");
                tokio::select! {
                    _ = cancel.cancelled() => return Err(GatewayError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            let context = self
                .conversations
                .load_context(&token, self.conversations.budget_for(&route.model))
                .await?;
            let files = with_carried_files(&attachments, &context, &route.model);
            let invocation = ToolInvocation {
                tool,
                model: &route.model,
                client: route.client.as_ref(),
                arguments: &arguments,
                attachments: &files,
                context: &context,
                turn_index,
            };

            let timeout = route.client.timeout();
            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(GatewayError::Cancelled),
                result = tokio::time::timeout(timeout, handler.handle(invocation)) => result,
            };

            let error = match outcome {
                Ok(Ok(output)) => {
                    let reply = NewTurn::assistant(output.text.clone()).with_model(
                        route.model.provider_id.as_str(),
                        route.model.model_id.as_str(),
                    );
                    self.conversations.append_turn(&token, reply).await?;
                    return Ok(ToolResponse {
                        tool_name: tool.name.clone(),
                        content: output.text,
                        continuation_id: token,
                        provider_id: route.model.provider_id.to_string(),
                        model_id: route.model.model_id.clone(),
                        usage: output.usage,
                        finish_reason: output.finish_reason,
                        attachments: output.attachments,
                        dropped_turns: context.dropped,
                    });
                }
                Ok(Err(e)) if e.is_transient() => e,
                Ok(Err(e)) => return Err(e),
                Err(_) => GatewayError::transient(
                    route.model.provider_id.as_str(),
                    format!("no response within {}s", timeout.as_secs_f32()),
                ),
            };

            warn!(
                attempt = attempt + 1,
                attempts,
                model = %route.model.qualified_name(),
                "Transient provider failure: {}",
                error
            );
            last_error = Some(error);
        }

        Err(GatewayError::NoAvailableModel(format!(
            "all {} attempts failed; last error: {}",
            attempts,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}

/// This request's files followed by those carried over from earlier turns.
/// Carried images are left out for models without vision.
fn with_carried_files(
    current: &[FileRef],
    context: &ThreadContext,
    model: &ModelDescriptor,
) -> Vec<FileRef> {
    let vision = model.supports(Capability::VisionGeneration);
    let mut files = current.to_vec();
    files.extend(
        context
            .carried_files(current)
            .into_iter()
            .filter(|f| vision || f.kind != FileKind::Image),
    );
    if files.len() > current.len() {
        debug!(carried = files.len() - current.len(), "Re-attaching files from earlier turns");
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConversationConfig, RouterConfig};
    use crate::ports::provider_client::ProviderClient;
    use crate::ports::tool_handler::ToolOutput;
    use crate::testing::{MemoryStore, MockClient};
    use async_trait::async_trait;
    use gateway_domain::{
        Capability, ContextMessage, CostClass, ErrorKind, GenerationOutput, GenerationRequest, ModelCatalog,
        ModelDescriptor, MountMapping, RequestId, Role, TransportKind,
    };
    use serde_json::{Value, json};
    use std::time::Duration;

    /// Forwards prompt and history to the routed client.
    struct EchoHandler;

    #[async_trait]
    impl ToolHandler for EchoHandler {
        async fn handle(&self, invocation: ToolInvocation<'_>) -> Result<ToolOutput, GatewayError> {
            let history = invocation.history().map(ContextMessage::from).collect();
            let request = GenerationRequest::new(invocation.arguments.prompt.clone())
                .with_history(history)
                .with_attachments(invocation.attachments.to_vec());
            let output = invocation.client.generate(invocation.model, &request).await?;
            Ok(ToolOutput {
                text: output.text,
                attachments: Vec::new(),
                usage: output.usage,
                finish_reason: output.finish_reason,
            })
        }
    }

    fn catalog() -> ModelCatalog {
        ModelCatalog::new(vec![
            ModelDescriptor::new("alpha", "alpha-text", CostClass::Low, 100_000),
            ModelDescriptor::new("beta", "beta-text", CostClass::Low, 100_000),
            ModelDescriptor::new("beta", "beta-vision", CostClass::Medium, 100_000)
                .with_vision(1_000_000),
        ])
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new([
            gateway_domain::ToolDefinition::new("chat", "Chat", [Capability::TextGeneration])
                .accepting_files(),
            gateway_domain::ToolDefinition::new("seer", "Images", [Capability::VisionGeneration])
                .accepting_images(),
        ])
    }

    struct Fixture {
        dispatcher: ExecutionDispatcher,
        alpha: Arc<MockClient>,
        beta: Arc<MockClient>,
        conversations: Arc<ConversationManager>,
    }

    fn fixture_with(alpha: MockClient, beta: MockClient, config: ConversationConfig) -> Fixture {
        let alpha = Arc::new(alpha);
        let beta = Arc::new(beta);
        let clients: Vec<Arc<dyn ProviderClient>> = vec![alpha.clone(), beta.clone()];
        let router = ModelRouter::new(
            catalog(),
            clients,
            RouterConfig::default().with_preference(["alpha", "beta"]),
        );
        let conversations = Arc::new(ConversationManager::new(Arc::new(MemoryStore::default()), config));
        let translator = PathTranslator::new(vec![MountMapping::new("/host/project", "/workspace")]);
        let dispatcher = ExecutionDispatcher::new(
            Arc::new(registry()),
            Arc::new(router),
            Arc::clone(&conversations),
            Arc::new(translator),
            Arc::new(EchoHandler),
        )
        .with_retry_policy(
            RetryPolicy::default()
                .with_max_attempts(3)
                .with_delays(Duration::from_millis(1), Duration::from_millis(5)),
        );
        Fixture {
            dispatcher,
            alpha,
            beta,
            conversations,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MockClient::new("alpha"), MockClient::new("beta"), ConversationConfig::default())
    }

    fn request(tool: &str, args: Value) -> ToolRequest {
        ToolRequest::new(
            tool,
            args.as_object().cloned().unwrap(),
            TransportKind::Stream,
            RequestId::new("1"),
        )
    }

    #[tokio::test]
    async fn test_new_thread_records_both_turns() {
        let f = fixture();
        let response = f
            .dispatcher
            .dispatch(&request("chat", json!({"prompt": "hello"})), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.content, "reply from alpha-text");
        assert_eq!(response.provider_id, "alpha");
        let thread = f.conversations.get_thread(&response.continuation_id).await.unwrap();
        assert_eq!(thread.turns.len(), 2);
        assert_eq!(thread.turns[0].role, Role::User);
        assert_eq!(thread.turns[0].content, "hello");
        assert_eq!(thread.turns[1].model_id.as_deref(), Some("alpha-text"));
        assert_eq!(thread.tool_name, "chat");
    }

    #[tokio::test]
    async fn test_continuation_replays_history_and_inherits_model() {
        let f = fixture();
        let first = f
            .dispatcher
            .dispatch(
                &request("chat", json!({"prompt": "one", "model": "beta-text"})),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(first.model_id, "beta-text");

        let second = f
            .dispatcher
            .dispatch(
                &request(
                    "chat",
                    json!({"prompt": "two", "continuation_id": first.continuation_id.as_str()}),
                ),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(second.continuation_id, first.continuation_id);
        assert_eq!(second.model_id, "beta-text");

        let sent = f.beta.last_request().unwrap();
        assert_eq!(sent.prompt, "two");
        let history: Vec<&str> = sent.history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(history, vec!["one", "reply from beta-text"]);

        let thread = f.conversations.get_thread(&first.continuation_id).await.unwrap();
        let indices: Vec<usize> = thread.turns.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_continuation_reattaches_earlier_files() {
        let f = fixture();
        let first = f
            .dispatcher
            .dispatch(
                &request(
                    "chat",
                    json!({"prompt": "read these", "files": [
                        "/host/project/src/a.rs",
                        "/host/project/shot.png",
                        "/host/project/b.rs",
                    ]}),
                ),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(first.model_id, "alpha-text");

        f.dispatcher
            .dispatch(
                &request(
                    "chat",
                    json!({
                        "prompt": "and this one",
                        "files": ["/host/project/c.rs", "/host/project/b.rs"],
                        "continuation_id": first.continuation_id.as_str(),
                    }),
                ),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let sent: Vec<String> = f
            .alpha
            .last_request()
            .unwrap()
            .attachments
            .iter()
            .map(|file| file.sandbox_path.display().to_string())
            .collect();
        // Current files first, then earlier ones once each; the text model
        // gets no carried image
        assert_eq!(
            sent,
            vec!["/workspace/c.rs", "/workspace/b.rs", "/workspace/src/a.rs"]
        );

        let thread = f.conversations.get_thread(&first.continuation_id).await.unwrap();
        assert_eq!(thread.turns[2].attached_files.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let f = fixture();
        let err = f
            .dispatcher
            .dispatch(&request("nope", json!({"prompt": "x"})), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.error.kind(), ErrorKind::UnknownTool);
        assert!(err.continuation_id.is_none());
    }

    #[tokio::test]
    async fn test_unknown_continuation() {
        let f = fixture();
        let err = f
            .dispatcher
            .dispatch(
                &request("chat", json!({"prompt": "x", "continuation_id": "missing"})),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.error, GatewayError::ThreadNotFound("missing".into()));
        assert_eq!(f.alpha.call_count(), 0);
    }

    #[tokio::test]
    async fn test_vision_tool_with_auto_and_mount() {
        let f = fixture();
        let response = f
            .dispatcher
            .dispatch(
                &request(
                    "seer",
                    json!({"prompt": "describe", "model": "auto", "images": ["/host/project/shot.png"]}),
                ),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(response.model_id, "beta-vision");

        let sent = f.beta.last_request().unwrap();
        assert_eq!(sent.attachments.len(), 1);
        assert_eq!(
            sent.attachments[0].sandbox_path,
            std::path::PathBuf::from("/workspace/shot.png")
        );
    }

    #[tokio::test]
    async fn test_path_outside_workspace_creates_no_thread() {
        let f = fixture();
        let err = f
            .dispatcher
            .dispatch(
                &request("chat", json!({"prompt": "x", "files": ["/etc/passwd"]})),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.error.kind(), ErrorKind::PathOutsideWorkspace);
        assert!(err.continuation_id.is_none());
        assert_eq!(f.alpha.call_count(), 0);
    }

    #[tokio::test]
    async fn test_transient_failure_falls_back_to_next_candidate() {
        let f = fixture_with(
            MockClient::new("alpha").then(Err(GatewayError::transient("alpha", "503"))),
            MockClient::new("beta"),
            ConversationConfig::default(),
        );
        let response = f
            .dispatcher
            .dispatch(&request("chat", json!({"prompt": "x"})), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.provider_id, "beta");
        assert_eq!(f.alpha.call_count(), 1);
        assert_eq!(f.beta.call_count(), 1);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried_and_thread_is_kept() {
        let f = fixture_with(
            MockClient::new("alpha").then(Err(GatewayError::permanent("alpha", "invalid key"))),
            MockClient::new("beta"),
            ConversationConfig::default(),
        );
        let err = f
            .dispatcher
            .dispatch(&request("chat", json!({"prompt": "x"})), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.error.kind(), ErrorKind::Provider);
        assert!(!err.error.is_transient());
        assert_eq!(f.beta.call_count(), 0);

        let token = err.continuation_id.unwrap();
        let thread = f.conversations.get_thread(&token).await.unwrap();
        assert_eq!(thread.turns.len(), 1);
    }

    #[tokio::test]
    async fn test_all_timeouts_exhaust_to_no_available_model() {
        let slow = Duration::from_millis(200);
        let f = fixture_with(
            MockClient::new("alpha")
                .with_timeout(Duration::from_millis(10))
                .with_delay(slow),
            MockClient::new("beta")
                .with_timeout(Duration::from_millis(10))
                .with_delay(slow),
            ConversationConfig::default(),
        );
        let err = f
            .dispatcher
            .dispatch(&request("chat", json!({"prompt": "x"})), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.error.kind(), ErrorKind::NoAvailableModel);
        assert_eq!(f.alpha.call_count() + f.beta.call_count(), 3);
    }

    #[tokio::test]
    async fn test_cancellation_aborts_provider_call() {
        let f = fixture_with(
            MockClient::new("alpha").with_delay(Duration::from_secs(30)),
            MockClient::new("beta"),
            ConversationConfig::default(),
        );
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });
        let err = f
            .dispatcher
            .dispatch(&request("chat", json!({"prompt": "x"})), &cancel)
            .await
            .unwrap_err();
        assert!(err.error.is_cancelled());

        // The user turn stays recorded.
        let thread = f.conversations.get_thread(&err.continuation_id.unwrap()).await.unwrap();
        assert_eq!(thread.turns.len(), 1);
    }

    #[tokio::test]
    async fn test_full_thread_is_rejected_before_generation() {
        let f = fixture_with(
            MockClient::new("alpha"),
            MockClient::new("beta"),
            ConversationConfig::default().with_max_turns(3),
        );
        let first = f
            .dispatcher
            .dispatch(&request("chat", json!({"prompt": "x"})), &CancellationToken::new())
            .await
            .unwrap();
        let err = f
            .dispatcher
            .dispatch(
                &request(
                    "chat",
                    json!({"prompt": "y", "continuation_id": first.continuation_id.as_str()}),
                ),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.error.kind(), ErrorKind::ThreadFull);
        assert_eq!(err.continuation_id, Some(first.continuation_id));
        assert_eq!(f.alpha.call_count(), 1);
    }

    #[tokio::test]
    async fn test_dedicated_handler_is_used() {
        struct Fixed;

        #[async_trait]
        impl ToolHandler for Fixed {
            async fn handle(&self, _invocation: ToolInvocation<'_>) -> Result<ToolOutput, GatewayError> {
                Ok(ToolOutput::text("fixed"))
            }
        }

        let f = fixture();
        let dispatcher = f.dispatcher.with_handler("chat", Arc::new(Fixed));
        let response = dispatcher
            .dispatch(&request("chat", json!({"prompt": "x"})), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.content, "fixed");
        assert_eq!(f.alpha.call_count(), 0);
    }

    #[tokio::test]
    async fn test_output_is_recorded_as_generation() {
        let f = fixture_with(
            MockClient::new("alpha").then(Ok(GenerationOutput::new("scripted"))),
            MockClient::new("beta"),
            ConversationConfig::default(),
        );
        let response = f
            .dispatcher
            .dispatch(&request("chat", json!({"prompt": "x"})), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.content, "scripted");
        assert_eq!(f.dispatcher.list_tools().len(), 2);
        assert_eq!(f.dispatcher.list_models().len(), 3);
    }
}
