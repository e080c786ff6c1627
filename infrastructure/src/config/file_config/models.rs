//! Model catalog configuration from TOML (`[models]` section)

use crate::providers::ProviderKind;
use gateway_domain::{Capability, ConfigIssue, ConfigIssueCode, ModelCatalog, ModelDescriptor};
use serde::{Deserialize, Serialize};

/// `[models]` section.
///
/// ```toml
/// [models]
/// default_vision = "gemini-2.5-pro"
///
/// [[models.custom]]
/// provider_id = "custom"
/// model_id = "qwen2.5-coder:32b"
/// capabilities = ["text_generation"]
/// cost_class = "free"
/// context_window = 32768
/// aliases = ["local"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelsConfig {
    /// Model tried first when a tool needs vision.
    pub default_vision: Option<String>,
    /// Extra catalog entries; an entry with the same provider and id as a
    /// built-in model replaces it.
    pub custom: Vec<ModelDescriptor>,
}

impl FileModelsConfig {
    /// Built-in catalog plus the configured entries.
    pub fn catalog(&self) -> ModelCatalog {
        ModelCatalog::builtin().with_models(self.custom.iter().cloned())
    }

    pub fn validate(&self, catalog: &ModelCatalog) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for model in &self.custom {
            if ProviderKind::parse(model.provider_id.as_str()).is_none() {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::UnknownProvider,
                    format!(
                        "models.custom: '{}' names unknown provider '{}'",
                        model.model_id, model.provider_id
                    ),
                ));
            }
        }

        if let Some(name) = &self.default_vision {
            let matches = catalog.find(name);
            if matches.is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::UnknownDefaultVisionModel,
                    format!("models.default_vision: unknown model '{name}'"),
                ));
            } else if !matches
                .iter()
                .any(|m| m.supports(Capability::VisionGeneration))
            {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DefaultVisionWithoutVision,
                    format!("models.default_vision: '{name}' does not support vision"),
                ));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_domain::{CostClass, ProviderId};

    #[test]
    fn test_custom_models_extend_catalog() {
        let config = FileModelsConfig {
            default_vision: None,
            custom: vec![
                ModelDescriptor::new("custom", "local-coder", CostClass::Free, 32_768)
                    .with_alias("local"),
            ],
        };
        let catalog = config.catalog();
        assert!(catalog.get(&ProviderId::new("custom"), "local-coder").is_some());
        assert_eq!(catalog.len(), ModelCatalog::builtin().len() + 1);
        assert!(config.validate(&catalog).is_empty());
    }

    #[test]
    fn test_deserialize_custom_model() {
        let config: FileModelsConfig = toml::from_str(
            r#"
[[custom]]
provider_id = "custom"
model_id = "llava"
capabilities = ["text_generation", "vision_generation"]
cost_class = "free"
context_window = 4096
max_image_bytes = 1048576
"#,
        )
        .unwrap();
        assert_eq!(config.custom.len(), 1);
        assert!(config.custom[0].supports(Capability::VisionGeneration));
        assert_eq!(config.custom[0].max_image_bytes, Some(1_048_576));
    }

    #[test]
    fn test_default_vision_checks() {
        let catalog = ModelCatalog::builtin();
        let unknown = FileModelsConfig {
            default_vision: Some("no-such-model".into()),
            custom: Vec::new(),
        };
        assert_eq!(
            unknown.validate(&catalog)[0].code,
            ConfigIssueCode::UnknownDefaultVisionModel
        );

        let text_only = FileModelsConfig {
            default_vision: Some("llama".into()),
            custom: Vec::new(),
        };
        assert_eq!(
            text_only.validate(&catalog)[0].code,
            ConfigIssueCode::DefaultVisionWithoutVision
        );

        let good = FileModelsConfig {
            default_vision: Some("gemini-2.5-pro".into()),
            custom: Vec::new(),
        };
        assert!(good.validate(&catalog).is_empty());
    }
}
