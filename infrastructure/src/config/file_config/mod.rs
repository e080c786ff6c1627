//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod conversation;
mod logging;
mod models;
mod mounts;
mod providers;
mod retry;

pub use conversation::{FileConversationConfig, FileStoreKind};
pub use logging::FileLoggingConfig;
pub use models::FileModelsConfig;
pub use mounts::{FileMountConfig, path_translator, validate_mounts};
pub use providers::{FileProviderConfig, FileProvidersConfig};
pub use retry::FileRetryConfig;

use gateway_application::{ConversationConfig, RetryPolicy, RouterConfig};
use gateway_domain::{ConfigIssue, ConfigIssueCode, ModelCatalog, PathTranslator};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Credentials, endpoints, preference order
    pub providers: FileProvidersConfig,
    /// Default vision model and extra catalog entries
    pub models: FileModelsConfig,
    /// Host → sandbox path mappings, first match wins
    pub mounts: Vec<FileMountConfig>,
    /// Thread limits and persistence
    pub conversation: FileConversationConfig,
    /// Fallback on transient provider failures
    pub retry: FileRetryConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks provider names, the default vision model, allow-lists,
    /// mounts, conversation limits and the retry policy. Credentials are
    /// checked separately by [`FileProvidersConfig::resolve`].
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let catalog = self.catalog();
        let mut issues = Vec::new();

        issues.extend(self.providers.validate());
        issues.extend(self.models.validate(&catalog));
        issues.extend(self.validate_allowed_models(&catalog));
        issues.extend(validate_mounts(&self.mounts));
        issues.extend(self.conversation.to_conversation_config().1);
        issues.extend(self.retry.to_retry_policy().1);

        issues
    }

    fn validate_allowed_models(&self, catalog: &ModelCatalog) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for (provider, allowed) in self.providers.allowed_models() {
            for name in allowed {
                let known = catalog.for_provider(&provider).any(|m| {
                    m.model_id.eq_ignore_ascii_case(&name) || m.has_alias(&name)
                });
                if !known {
                    issues.push(ConfigIssue::warning(
                        ConfigIssueCode::UnknownAllowedModel,
                        format!(
                            "providers.{provider}.allowed_models: '{name}' matches no {provider} model"
                        ),
                    ));
                }
            }
        }
        issues
    }

    pub fn catalog(&self) -> ModelCatalog {
        self.models.catalog()
    }

    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            preference: self.providers.preference_ids(),
            default_vision_model: self.models.default_vision.clone(),
            allowed_models: self.providers.allowed_models(),
        }
    }

    pub fn conversation_config(&self) -> ConversationConfig {
        self.conversation.to_conversation_config().0
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.to_retry_policy().0
    }

    pub fn path_translator(&self, cwd: &Path) -> PathTranslator {
        path_translator(&self.mounts, cwd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_domain::ProviderId;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[providers]
preference = ["gemini", "openai"]
timeout_secs = 60

[providers.openai]
api_key_env = "MY_OPENAI_KEY"
allowed_models = ["o3", "mini"]

[models]
default_vision = "gemini-2.5-pro"

[[mounts]]
host = "/Users/me/src"
sandbox = "/workspace"

[conversation]
max_turns = 20
ttl_secs = 600

[retry]
max_attempts = 4

[logging]
request_log = "/tmp/zen-requests.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_empty(), "{:?}", config.validate());

        let router = config.router_config();
        assert_eq!(
            router.preference,
            vec![ProviderId::new("gemini"), ProviderId::new("openai")]
        );
        assert_eq!(router.default_vision_model.as_deref(), Some("gemini-2.5-pro"));
        assert_eq!(router.allowed_models[&ProviderId::new("openai")].len(), 2);

        assert_eq!(config.conversation_config().max_turns, 20);
        assert_eq!(config.conversation_config().ttl, Duration::from_secs(600));
        assert_eq!(config.retry_policy().max_attempts, 4);
        assert_eq!(
            config.logging.request_log,
            Some(PathBuf::from("/tmp/zen-requests.jsonl"))
        );

        let translator = config.path_translator(Path::new("/cwd"));
        assert_eq!(
            translator.translate("/Users/me/src/a.rs").unwrap().sandbox_path,
            PathBuf::from("/workspace/a.rs")
        );
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
        assert!(config.router_config().preference.is_empty());
        assert_eq!(config.conversation.store, FileStoreKind::File);
        assert_eq!(config.catalog().len(), ModelCatalog::builtin().len());
    }

    #[test]
    fn test_unknown_allowed_model_warns() {
        let config: FileConfig = toml::from_str(
            r#"
[providers.anthropic]
allowed_models = ["sonnet", "gpt-4.1"]
"#,
        )
        .unwrap();
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::UnknownAllowedModel);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn test_collects_every_issue() {
        let config: FileConfig = toml::from_str(
            r#"
[providers]
preference = ["bedrock"]

[models]
default_vision = "haiku"

[[mounts]]
host = "relative"
sandbox = "/w"

[retry]
max_attempts = 0
"#,
        )
        .unwrap();
        let codes: Vec<ConfigIssueCode> = config.validate().iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![
                ConfigIssueCode::UnknownProvider,
                ConfigIssueCode::DefaultVisionWithoutVision,
                ConfigIssueCode::InvalidMount,
                ConfigIssueCode::InvalidRetryPolicy,
            ]
        );
    }
}
