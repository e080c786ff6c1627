//! Provider configuration from TOML (`[providers]` section)

use crate::providers::{ProviderKind, ProviderSettings};
use gateway_domain::{ConfigIssue, ConfigIssueCode, ProviderId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Settings for one upstream provider.
///
/// Every field is optional; unset values fall back to the vendor defaults
/// of the provider's [`ProviderKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Set to false to ignore the provider even when a key is present.
    pub enabled: bool,
    /// Environment variable holding the API key.
    pub api_key_env: Option<String>,
    /// Direct API key; prefer `api_key_env`.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Per-call timeout; overrides `providers.timeout_secs`.
    pub timeout_secs: Option<u64>,
    /// Output cap for models that declare none.
    pub max_tokens: Option<u32>,
    /// Anthropic version header or Azure `api-version` query.
    pub api_version: Option<String>,
    /// Model ids or aliases this provider may serve. Empty allows all.
    pub allowed_models: Vec<String>,
    /// Azure only: model id to deployment name.
    pub deployments: HashMap<String, String>,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: None,
            api_key: None,
            base_url: None,
            timeout_secs: None,
            max_tokens: None,
            api_version: None,
            allowed_models: Vec::new(),
            deployments: HashMap::new(),
        }
    }
}

/// `[providers]` section.
///
/// ```toml
/// [providers]
/// preference = ["gemini", "openai"]
/// timeout_secs = 90
///
/// [providers.openai]
/// allowed_models = ["o3", "mini"]
///
/// [providers.azure]
/// base_url = "https://acme.openai.azure.com"
/// deployments = { "gpt-4o" = "prod-gpt4o" }
///
/// [providers.custom]
/// base_url = "http://localhost:11434/v1"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Routing order; configured providers not listed follow in name order.
    pub preference: Vec<String>,
    /// Default per-call timeout in seconds.
    pub timeout_secs: u64,
    pub openai: FileProviderConfig,
    pub azure: FileProviderConfig,
    pub openrouter: FileProviderConfig,
    pub requesty: FileProviderConfig,
    pub anthropic: FileProviderConfig,
    pub gemini: FileProviderConfig,
    pub custom: FileProviderConfig,
}

impl Default for FileProvidersConfig {
    fn default() -> Self {
        Self {
            preference: Vec::new(),
            timeout_secs: 120,
            openai: FileProviderConfig::default(),
            azure: FileProviderConfig::default(),
            openrouter: FileProviderConfig::default(),
            requesty: FileProviderConfig::default(),
            anthropic: FileProviderConfig::default(),
            gemini: FileProviderConfig::default(),
            custom: FileProviderConfig::default(),
        }
    }
}

impl FileProvidersConfig {
    pub fn entry(&self, kind: ProviderKind) -> &FileProviderConfig {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Azure => &self.azure,
            ProviderKind::OpenRouter => &self.openrouter,
            ProviderKind::Requesty => &self.requesty,
            ProviderKind::Anthropic => &self.anthropic,
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::Custom => &self.custom,
        }
    }

    fn preferred(&self, kind: ProviderKind) -> bool {
        self.preference
            .iter()
            .any(|p| p.eq_ignore_ascii_case(kind.as_str()))
    }

    /// Preference order as provider ids.
    pub fn preference_ids(&self) -> Vec<ProviderId> {
        self.preference
            .iter()
            .map(|p| ProviderId::new(p.to_ascii_lowercase()))
            .collect()
    }

    /// Non-empty allow-lists keyed by provider.
    pub fn allowed_models(&self) -> HashMap<ProviderId, Vec<String>> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| !self.entry(*kind).allowed_models.is_empty())
            .map(|kind| {
                (
                    ProviderId::new(kind.as_str()),
                    self.entry(kind).allowed_models.clone(),
                )
            })
            .collect()
    }

    /// Resolve credentials and produce settings for every usable provider.
    ///
    /// `env` looks up environment variables. Providers without a credential
    /// are skipped; a warning is returned when the user asked for them.
    pub fn resolve(
        &self,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> (Vec<ProviderSettings>, Vec<ConfigIssue>) {
        let mut settings = Vec::new();
        let mut issues = Vec::new();

        for kind in ProviderKind::ALL {
            let entry = self.entry(kind);
            if !entry.enabled {
                debug!(provider = %kind, "Provider disabled");
                continue;
            }
            let Some(base_url) = entry
                .base_url
                .clone()
                .or_else(|| kind.default_base_url().map(str::to_string))
                .or_else(|| kind.base_url_env().and_then(env))
                .filter(|url| !url.trim().is_empty())
            else {
                if self.preferred(kind) {
                    issues.push(ConfigIssue::warning(
                        ConfigIssueCode::MissingCredential,
                        format!(
                            "providers.{kind}: no endpoint configured (set base_url{})",
                            kind.base_url_env().map(|v| format!(" or {v}")).unwrap_or_default()
                        ),
                    ));
                }
                continue;
            };

            let key_env = entry
                .api_key_env
                .clone()
                .or_else(|| kind.default_api_key_env().map(str::to_string));
            let api_key = entry
                .api_key
                .clone()
                .or_else(|| key_env.as_deref().and_then(env))
                .filter(|k| !k.trim().is_empty());

            let needs_key = !kind.credential_optional() || entry.api_key_env.is_some();
            if api_key.is_none() && needs_key {
                let requested = self.preferred(kind) || entry.api_key_env.is_some();
                if requested {
                    issues.push(ConfigIssue::warning(
                        ConfigIssueCode::MissingCredential,
                        format!(
                            "providers.{kind}: no API key found (set {})",
                            key_env.as_deref().unwrap_or("api_key")
                        ),
                    ));
                }
                debug!(provider = %kind, "Provider skipped: no credential");
                continue;
            }

            let mut provider = ProviderSettings::new(kind, base_url).with_timeout(
                Duration::from_secs(entry.timeout_secs.unwrap_or(self.timeout_secs)),
            );
            if let Some(key) = api_key {
                provider = provider.with_api_key(key);
            }
            if let Some(tokens) = entry.max_tokens {
                provider = provider.with_max_output_tokens(tokens);
            }
            if let Some(version) = &entry.api_version {
                provider.api_version = version.clone();
            }
            for (model_id, deployment) in &entry.deployments {
                provider = provider.with_deployment(model_id.clone(), deployment.clone());
            }
            settings.push(provider);
        }

        if settings.is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::NoUsableProvider,
                "no provider has a credential; set OPENAI_API_KEY, GEMINI_API_KEY, \
                 ANTHROPIC_API_KEY, OPENROUTER_API_KEY, REQUESTY_API_KEY, \
                 AZURE_OPENAI_API_KEY with AZURE_OPENAI_ENDPOINT, or providers.custom.base_url",
            ));
        }

        (settings, issues)
    }

    /// Static checks that need no environment.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for name in &self.preference {
            if ProviderKind::parse(name).is_none() {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::UnknownProvider,
                    format!("providers.preference: unknown provider '{name}'"),
                ));
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name: &str| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_resolve_from_env() {
        let config = FileProvidersConfig {
            preference: vec!["gemini".into(), "openai".into()],
            ..Default::default()
        };
        let env = env_with(&[("GEMINI_API_KEY", "g-key")]);
        let (settings, issues) = config.resolve(&env);

        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].kind, ProviderKind::Gemini);
        assert_eq!(settings[0].api_key.as_deref(), Some("g-key"));
        assert_eq!(settings[0].timeout, Duration::from_secs(120));
        // openai is preferred but has no key
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::MissingCredential);
    }

    #[test]
    fn test_custom_endpoint_without_credential() {
        let mut config = FileProvidersConfig::default();
        config.custom.base_url = Some("http://localhost:11434/v1".into());
        config.custom.timeout_secs = Some(300);
        let (settings, issues) = config.resolve(&|_| None);

        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].kind, ProviderKind::Custom);
        assert!(settings[0].api_key.is_none());
        assert_eq!(settings[0].timeout, Duration::from_secs(300));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_custom_with_unset_key_env_is_skipped() {
        let mut config = FileProvidersConfig::default();
        config.custom.base_url = Some("http://localhost:8000/v1".into());
        config.custom.api_key_env = Some("LOCAL_KEY".into());
        let (settings, issues) = config.resolve(&|_| None);

        assert!(settings.is_empty());
        assert!(issues.iter().any(|i| i.code == ConfigIssueCode::MissingCredential));
        assert!(issues.iter().any(|i| i.code == ConfigIssueCode::NoUsableProvider));
    }

    #[test]
    fn test_direct_key_and_disabled() {
        let mut config = FileProvidersConfig::default();
        config.anthropic.api_key = Some("a-key".into());
        config.anthropic.api_version = Some("2024-01-01".into());
        config.openai.enabled = false;
        let env = env_with(&[("OPENAI_API_KEY", "o-key")]);
        let (settings, _) = config.resolve(&env);

        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].kind, ProviderKind::Anthropic);
        assert_eq!(settings[0].api_version, "2024-01-01");
    }

    #[test]
    fn test_azure_from_env_with_deployments() {
        let mut config = FileProvidersConfig::default();
        config
            .azure
            .deployments
            .insert("gpt-4o".into(), "prod-gpt4o".into());
        let env = env_with(&[
            ("AZURE_OPENAI_API_KEY", "az-key"),
            ("AZURE_OPENAI_ENDPOINT", "https://acme.openai.azure.com"),
        ]);
        let (settings, issues) = config.resolve(&env);

        assert!(issues.is_empty());
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].kind, ProviderKind::Azure);
        assert_eq!(settings[0].base_url, "https://acme.openai.azure.com");
        assert_eq!(settings[0].api_version, "2024-02-01");
        assert_eq!(settings[0].deployment("gpt-4o"), "prod-gpt4o");
    }

    #[test]
    fn test_azure_without_endpoint_is_reported_when_preferred() {
        let config = FileProvidersConfig {
            preference: vec!["azure".into()],
            ..Default::default()
        };
        let env = env_with(&[("AZURE_OPENAI_API_KEY", "az-key")]);
        let (settings, issues) = config.resolve(&env);

        assert!(settings.is_empty());
        assert!(issues.iter().any(|i| i.message.contains("AZURE_OPENAI_ENDPOINT")));
    }

    #[test]
    fn test_requesty_from_env() {
        let env = env_with(&[("REQUESTY_API_KEY", "rq-key")]);
        let (settings, _) = FileProvidersConfig::default().resolve(&env);

        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].kind, ProviderKind::Requesty);
        assert_eq!(settings[0].base_url, "https://router.requesty.ai/v1");
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let env = env_with(&[("OPENAI_API_KEY", "  ")]);
        let (settings, _) = FileProvidersConfig::default().resolve(&env);
        assert!(settings.is_empty());
    }

    #[test]
    fn test_allowed_models_and_preference() {
        let mut config = FileProvidersConfig {
            preference: vec!["OpenAI".into(), "bedrock".into()],
            ..Default::default()
        };
        config.openai.allowed_models = vec!["o3".into()];

        let allowed = config.allowed_models();
        assert_eq!(allowed.len(), 1);
        assert_eq!(allowed[&ProviderId::new("openai")], vec!["o3".to_string()]);
        assert_eq!(config.preference_ids()[0], ProviderId::new("openai"));

        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::UnknownProvider);
    }
}
