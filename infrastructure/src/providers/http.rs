//! HTTP provider client and failure classification.

use super::attachments::{self, AttachmentLimits, PreparedAttachment};
use super::{ProviderKind, ProviderSettings, anthropic, gemini, openai_compat};
use async_trait::async_trait;
use gateway_application::ProviderClient;
use gateway_domain::util::preview;
use gateway_domain::{GatewayError, GenerationOutput, GenerationRequest, ModelDescriptor, ProviderId};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Longest upstream error body quoted in an error message.
const MAX_ERROR_BODY: usize = 300;

const OPENROUTER_REFERER: &str = "https://github.com/zen-gateway/zen-gateway";
const OPENROUTER_TITLE: &str = "Zen Gateway";

/// Classify a non-success HTTP status.
///
/// Timeouts, rate limits and server errors are transient; every other
/// status (bad credentials, policy rejections, malformed requests) is
/// permanent.
pub fn classify_status(provider: &str, status: StatusCode, body: &str) -> GatewayError {
    let message = format!("HTTP {}: {}", status.as_u16(), error_message(body));
    if status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
    {
        GatewayError::transient(provider, message)
    } else {
        GatewayError::permanent(provider, message)
    }
}

/// Classify a transport failure (no HTTP status available).
pub fn classify_transport(provider: &str, err: &reqwest::Error) -> GatewayError {
    if err.is_builder() {
        return GatewayError::permanent(provider, format!("invalid request: {err}"));
    }
    let what = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    GatewayError::transient(provider, format!("{what}: {err}"))
}

/// Pull `error.message` (or `message`) out of a vendor error body, falling
/// back to the truncated raw body.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let message = value
            .pointer("/error/message")
            .or_else(|| value.get("message"))
            .and_then(Value::as_str);
        if let Some(message) = message {
            return message.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        preview(trimmed, MAX_ERROR_BODY)
    }
}

/// [`ProviderClient`] speaking one vendor's HTTP API.
pub struct HttpProviderClient {
    settings: ProviderSettings,
    http: reqwest::Client,
    limits: AttachmentLimits,
}

impl HttpProviderClient {
    pub fn new(settings: ProviderSettings) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("zen-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http(settings, http))
    }

    fn with_http(settings: ProviderSettings, http: reqwest::Client) -> Self {
        Self {
            settings,
            http,
            limits: AttachmentLimits::default(),
        }
    }

    pub fn with_attachment_limits(mut self, limits: AttachmentLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn wire_request(
        &self,
        model: &ModelDescriptor,
        request: &GenerationRequest,
        prepared: &[PreparedAttachment],
    ) -> (String, Value) {
        let max_tokens = model
            .max_output_tokens
            .unwrap_or(self.settings.max_output_tokens);
        match self.settings.kind {
            ProviderKind::OpenAi
            | ProviderKind::OpenRouter
            | ProviderKind::Requesty
            | ProviderKind::Custom => (
                self.settings.endpoint(openai_compat::CHAT_COMPLETIONS_PATH),
                openai_compat::build_request(self.settings.kind, model, request, prepared, max_tokens),
            ),
            ProviderKind::Azure => (
                self.settings.endpoint(&openai_compat::azure_path(
                    self.settings.deployment(&model.model_id),
                    &self.settings.api_version,
                )),
                openai_compat::build_request(self.settings.kind, model, request, prepared, max_tokens),
            ),
            ProviderKind::Anthropic => (
                self.settings.endpoint(anthropic::MESSAGES_PATH),
                anthropic::build_request(model, request, prepared, max_tokens),
            ),
            ProviderKind::Gemini => (
                self.settings.endpoint(&gemini::generate_path(&model.model_id)),
                gemini::build_request(model, request, prepared, max_tokens),
            ),
        }
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let Some(key) = self.settings.api_key.as_deref() else {
            return builder;
        };
        match self.settings.kind {
            ProviderKind::Anthropic => builder
                .header("x-api-key", key)
                .header("anthropic-version", self.settings.api_version.as_str()),
            ProviderKind::Gemini => builder.header("x-goog-api-key", key),
            ProviderKind::Azure => builder.header("api-key", key),
            ProviderKind::OpenRouter => builder
                .bearer_auth(key)
                .header("HTTP-Referer", OPENROUTER_REFERER)
                .header("X-Title", OPENROUTER_TITLE),
            ProviderKind::OpenAi | ProviderKind::Requesty | ProviderKind::Custom => {
                builder.bearer_auth(key)
            }
        }
    }

    fn parse(&self, body: Value) -> Result<GenerationOutput, String> {
        match self.settings.kind {
            ProviderKind::OpenAi
            | ProviderKind::Azure
            | ProviderKind::OpenRouter
            | ProviderKind::Requesty
            | ProviderKind::Custom => openai_compat::parse_response(body),
            ProviderKind::Anthropic => anthropic::parse_response(body),
            ProviderKind::Gemini => gemini::parse_response(body),
        }
    }
}

#[async_trait]
impl ProviderClient for HttpProviderClient {
    fn provider_id(&self) -> &ProviderId {
        &self.settings.id
    }

    fn timeout(&self) -> Duration {
        self.settings.timeout
    }

    async fn generate(
        &self,
        model: &ModelDescriptor,
        request: &GenerationRequest,
    ) -> Result<GenerationOutput, GatewayError> {
        let provider = self.settings.id.as_str();
        let prepared = attachments::prepare(&request.attachments, model, &self.limits).await?;
        let (url, body) = self.wire_request(model, request, &prepared);

        debug!(
            provider,
            model = %model.model_id,
            url = %url,
            history = request.history.len(),
            attachments = prepared.len(),
            "Sending generation request"
        );

        let response = self
            .authorize(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_transport(provider, &e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = classify_status(provider, status, &text);
            warn!(provider, model = %model.model_id, status = status.as_u16(), "Provider returned an error: {}", err);
            return Err(err);
        }

        let value: Value = response.json().await.map_err(|e| {
            GatewayError::transient(provider, format!("failed to read response body: {e}"))
        })?;
        let output = self
            .parse(value)
            .map_err(|message| GatewayError::permanent(provider, message))?;

        debug!(
            provider,
            model = %model.model_id,
            input_tokens = output.usage.input_tokens,
            output_tokens = output.usage.output_tokens,
            finish_reason = output.finish_reason.as_str(),
            "Generation finished"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_domain::{CostClass, ErrorKind, FailureClass, FileKind, FileRef};
    use std::path::PathBuf;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response and hand back the raw request.
    async fn serve_once(status_line: &'static str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let body = body.to_string();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if request_complete(&buf) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&buf).to_string()
        });

        (base_url, handle)
    }

    fn request_complete(buf: &[u8]) -> bool {
        let text = String::from_utf8_lossy(buf);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        buf.len() >= header_end + 4 + content_length
    }

    fn client(kind: ProviderKind, base_url: &str) -> HttpProviderClient {
        let settings = ProviderSettings::new(kind, base_url)
            .with_api_key("sk-test")
            .with_timeout(Duration::from_secs(5));
        // Local test servers must not go through a proxy from the environment
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .no_proxy()
            .build()
            .unwrap();
        HttpProviderClient::with_http(settings, http)
    }

    fn model(provider: &str) -> ModelDescriptor {
        ModelDescriptor::new(provider, "test-model", CostClass::Low, 32_000)
    }

    #[test]
    fn test_classify_status() {
        for status in [
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::REQUEST_TIMEOUT,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            assert!(classify_status("p", status, "").is_transient(), "{status}");
        }
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
            StatusCode::FORBIDDEN,
            StatusCode::NOT_FOUND,
        ] {
            assert!(!classify_status("p", status, "").is_transient(), "{status}");
        }
    }

    #[test]
    fn test_error_message_extraction() {
        let err = classify_status(
            "openai",
            StatusCode::UNAUTHORIZED,
            r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#,
        );
        assert_eq!(
            err,
            GatewayError::Provider {
                provider: "openai".into(),
                class: FailureClass::Permanent,
                message: "HTTP 401: Incorrect API key provided".into(),
            }
        );

        let long = "x".repeat(1000);
        let err = classify_status("p", StatusCode::BAD_GATEWAY, &long);
        assert!(err.to_string().len() < 400);
    }

    #[tokio::test]
    async fn test_openai_compatible_round_trip() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"content":"pong"},"finish_reason":"stop"}],"usage":{"prompt_tokens":3,"completion_tokens":1}}"#,
        )
        .await;
        let client = client(ProviderKind::Custom, &format!("{base_url}/v1"));

        let output = client
            .generate(&model("custom"), &GenerationRequest::new("ping"))
            .await
            .unwrap();
        assert_eq!(output.text, "pong");
        assert_eq!(output.usage.total(), 4);

        let raw = server.await.unwrap().to_ascii_lowercase();
        assert!(raw.starts_with("post /v1/chat/completions "));
        assert!(raw.contains("authorization: bearer sk-test"));
        assert!(raw.contains("\"ping\""));
    }

    #[tokio::test]
    async fn test_anthropic_headers() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"content":[{"type":"text","text":"hi"}],"stop_reason":"end_turn","usage":{"input_tokens":1,"output_tokens":1}}"#,
        )
        .await;
        let client = client(ProviderKind::Anthropic, &base_url);

        let output = client
            .generate(&model("anthropic"), &GenerationRequest::new("hello"))
            .await
            .unwrap();
        assert_eq!(output.text, "hi");

        let raw = server.await.unwrap().to_ascii_lowercase();
        assert!(raw.starts_with("post /v1/messages "));
        assert!(raw.contains("x-api-key: sk-test"));
        assert!(raw.contains("anthropic-version: 2023-06-01"));
    }

    #[tokio::test]
    async fn test_gemini_path_and_key() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"candidates":[{"content":{"parts":[{"text":"ok"}]},"finishReason":"STOP"}]}"#,
        )
        .await;
        let client = client(ProviderKind::Gemini, &base_url);

        let output = client
            .generate(&model("gemini"), &GenerationRequest::new("hello"))
            .await
            .unwrap();
        assert_eq!(output.text, "ok");

        let raw = server.await.unwrap().to_ascii_lowercase();
        assert!(raw.starts_with("post /v1beta/models/test-model:generatecontent "));
        assert!(raw.contains("x-goog-api-key: sk-test"));
    }

    #[tokio::test]
    async fn test_azure_deployment_routing() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"content":"ok"},"finish_reason":"stop"}]}"#,
        )
        .await;
        let mut client = client(ProviderKind::Azure, &base_url);
        client.settings = client.settings.with_deployment("test-model", "prod-deploy");

        let request = GenerationRequest::new("hello").with_temperature(Some(0.4));
        let output = client
            .generate(&model("azure").with_fixed_temperature(1.0), &request)
            .await
            .unwrap();
        assert_eq!(output.text, "ok");

        let raw = server.await.unwrap();
        let lower = raw.to_ascii_lowercase();
        assert!(lower.starts_with(
            "post /openai/deployments/prod-deploy/chat/completions?api-version=2024-02-01 "
        ));
        assert!(lower.contains("api-key: sk-test"));
        assert!(!lower.contains("authorization:"));
        assert!(!raw.contains("\"temperature\""));
    }

    #[tokio::test]
    async fn test_requesty_uses_bearer_auth() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"content":"ok"},"finish_reason":"stop"}]}"#,
        )
        .await;
        let client = client(ProviderKind::Requesty, &format!("{base_url}/v1"));

        client
            .generate(&model("requesty"), &GenerationRequest::new("hello"))
            .await
            .unwrap();

        let raw = server.await.unwrap().to_ascii_lowercase();
        assert!(raw.starts_with("post /v1/chat/completions "));
        assert!(raw.contains("authorization: bearer sk-test"));
    }

    #[tokio::test]
    async fn test_rate_limit_is_transient() {
        let (base_url, _server) =
            serve_once("429 Too Many Requests", r#"{"error":{"message":"slow down"}}"#).await;
        let client = client(ProviderKind::OpenRouter, &base_url);

        let err = client
            .generate(&model("openrouter"), &GenerationRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert!(err.to_string().contains("slow down"));
    }

    #[tokio::test]
    async fn test_bad_request_is_permanent() {
        let (base_url, _server) =
            serve_once("400 Bad Request", r#"{"error":{"message":"unknown model"}}"#).await;
        let client = client(ProviderKind::OpenAi, &base_url);

        let err = client
            .generate(&model("openai"), &GenerationRequest::new("hi"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let client = client(ProviderKind::OpenAi, &base_url);

        let err = client
            .generate(&model("openai"), &GenerationRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_invalid_attachment_fails_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("diagram.png");
        std::fs::write(&image, b"\x89PNG\r\n\x1a\n").unwrap();
        // Nothing listens here; reaching the network would be a provider error
        let client = client(ProviderKind::OpenAi, "http://127.0.0.1:9");

        let request = GenerationRequest::new("describe").with_attachments(vec![FileRef {
            host_path: PathBuf::from("/host/diagram.png"),
            sandbox_path: image,
            kind: FileKind::Image,
        }]);
        let err = client.generate(&model("openai"), &request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAttachment);
    }
}
