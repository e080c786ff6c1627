//! Provider clients
//!
//! Every upstream vendor is served by one [`HttpProviderClient`]; the
//! [`ProviderKind`] picks the wire format and authentication scheme.
//! Vendor-specific request building and response parsing live in pure
//! functions per vendor module so they can be tested without a network.

pub mod anthropic;
pub mod attachments;
pub mod gemini;
pub mod http;
pub mod openai_compat;

pub use attachments::{AttachmentLimits, PreparedAttachment};
pub use http::HttpProviderClient;

/// Azure OpenAI `api-version` used when none is configured.
pub const AZURE_API_VERSION: &str = "2024-02-01";

use crate::config::ConfigError;
use gateway_application::ProviderClient;
use gateway_domain::ProviderId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Upstream API family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI Chat Completions
    OpenAi,
    /// Azure OpenAI (deployment-scoped Chat Completions)
    Azure,
    /// OpenRouter (OpenAI-compatible)
    OpenRouter,
    /// Requesty router (OpenAI-compatible)
    Requesty,
    /// Anthropic Messages API
    Anthropic,
    /// Google Gemini generateContent
    Gemini,
    /// Any OpenAI-compatible endpoint (Ollama, vLLM, LM Studio, ...)
    Custom,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 7] = [
        ProviderKind::OpenAi,
        ProviderKind::Azure,
        ProviderKind::OpenRouter,
        ProviderKind::Requesty,
        ProviderKind::Anthropic,
        ProviderKind::Gemini,
        ProviderKind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Azure => "azure",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::Requesty => "requesty",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Custom => "custom",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }

    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("https://api.openai.com/v1"),
            ProviderKind::OpenRouter => Some("https://openrouter.ai/api/v1"),
            ProviderKind::Requesty => Some("https://router.requesty.ai/v1"),
            ProviderKind::Anthropic => Some("https://api.anthropic.com"),
            ProviderKind::Gemini => Some("https://generativelanguage.googleapis.com"),
            // Per-resource endpoints; see `base_url_env`
            ProviderKind::Azure | ProviderKind::Custom => None,
        }
    }

    /// Environment variable consulted for the endpoint when none is configured.
    pub fn base_url_env(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Azure => Some("AZURE_OPENAI_ENDPOINT"),
            _ => None,
        }
    }

    /// Version sent with every request, for vendors that version their API.
    pub fn default_api_version(&self) -> &'static str {
        match self {
            ProviderKind::Azure => AZURE_API_VERSION,
            _ => anthropic::DEFAULT_API_VERSION,
        }
    }

    /// Environment variable consulted for the API key when none is configured.
    pub fn default_api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::Azure => Some("AZURE_OPENAI_API_KEY"),
            ProviderKind::OpenRouter => Some("OPENROUTER_API_KEY"),
            ProviderKind::Requesty => Some("REQUESTY_API_KEY"),
            ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderKind::Gemini => Some("GEMINI_API_KEY"),
            ProviderKind::Custom => None,
        }
    }

    /// Whether the variant can work without any credential.
    pub fn credential_optional(&self) -> bool {
        matches!(self, ProviderKind::Custom)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved settings for one provider client.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub id: ProviderId,
    pub kind: ProviderKind,
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    /// Output cap used when the model declares none
    pub max_output_tokens: u32,
    /// `anthropic-version` header, or the Azure `api-version` query
    pub api_version: String,
    /// Azure deployment name per model id; unmapped models use their id
    pub deployments: HashMap<String, String>,
}

impl ProviderSettings {
    pub fn new(kind: ProviderKind, base_url: impl Into<String>) -> Self {
        Self {
            id: ProviderId::new(kind.as_str()),
            kind,
            base_url: base_url.into(),
            api_key: None,
            timeout: Duration::from_secs(120),
            max_output_tokens: 8192,
            api_version: kind.default_api_version().to_string(),
            deployments: HashMap::new(),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = tokens;
        self
    }

    pub fn with_deployment(mut self, model_id: impl Into<String>, deployment: impl Into<String>) -> Self {
        self.deployments.insert(model_id.into(), deployment.into());
        self
    }

    /// Azure deployment serving `model_id`.
    pub fn deployment<'a>(&'a self, model_id: &'a str) -> &'a str {
        self.deployments
            .get(model_id)
            .map(String::as_str)
            .unwrap_or(model_id)
    }

    /// `base_url` joined with `path`, without doubled slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// One client per resolved provider, in the order given.
pub fn build_provider_clients(
    settings: &[ProviderSettings],
) -> Result<Vec<Arc<dyn ProviderClient>>, ConfigError> {
    settings
        .iter()
        .map(|s| {
            HttpProviderClient::new(s.clone())
                .map(|client| Arc::new(client) as Arc<dyn ProviderClient>)
                .map_err(|e| ConfigError::HttpClient {
                    provider: s.id.to_string(),
                    message: e.to_string(),
                })
        })
        .collect()
}
