//! Model catalog
//!
//! The catalog lists every model the gateway knows about, whether or not its
//! provider is configured. The router decides availability.

use super::descriptor::{CostClass, ModelDescriptor, ProviderId};
use crate::tool::entities::Capability;

const MB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: Vec<ModelDescriptor>,
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        Self { models }
    }

    /// Models shipped with the gateway.
    pub fn builtin() -> Self {
        use Capability::FunctionCalling as Tools;

        let models = vec![
            // Gemini
            ModelDescriptor::new("gemini", "gemini-2.5-pro", CostClass::High, 1_048_576)
                .with_vision(32 * MB)
                .with_capability(Tools)
                .with_max_output_tokens(65_536)
                .with_alias("pro")
                .with_alias("gemini-pro"),
            ModelDescriptor::new("gemini", "gemini-2.5-flash", CostClass::Low, 1_048_576)
                .with_vision(20 * MB)
                .with_capability(Tools)
                .with_max_output_tokens(65_536)
                .with_alias("flash")
                .with_alias("gemini-flash"),
            ModelDescriptor::new("gemini", "gemini-2.0-flash-lite", CostClass::Low, 1_048_576)
                .with_max_output_tokens(8_192)
                .with_alias("flash-lite"),
            // OpenAI
            ModelDescriptor::new("openai", "o3", CostClass::High, 200_000)
                .with_vision(20 * MB)
                .with_capability(Tools)
                .with_max_output_tokens(100_000)
                .with_fixed_temperature(1.0),
            ModelDescriptor::new("openai", "o3-mini", CostClass::Medium, 200_000)
                .with_capability(Tools)
                .with_max_output_tokens(100_000)
                .with_fixed_temperature(1.0)
                .with_alias("o3mini"),
            ModelDescriptor::new("openai", "o4-mini", CostClass::Medium, 200_000)
                .with_vision(20 * MB)
                .with_capability(Tools)
                .with_max_output_tokens(100_000)
                .with_fixed_temperature(1.0)
                .with_alias("mini")
                .with_alias("o4mini"),
            ModelDescriptor::new("openai", "gpt-4.1", CostClass::Medium, 1_047_576)
                .with_vision(20 * MB)
                .with_capability(Tools)
                .with_max_output_tokens(32_768)
                .with_temperature_range(0.0, 2.0)
                .with_alias("gpt4.1"),
            // Anthropic
            ModelDescriptor::new("anthropic", "claude-opus-4-0", CostClass::Premium, 200_000)
                .with_vision(5 * MB)
                .with_capability(Tools)
                .with_max_output_tokens(32_000)
                .with_temperature_range(0.0, 1.0)
                .with_alias("opus"),
            ModelDescriptor::new("anthropic", "claude-sonnet-4-0", CostClass::High, 200_000)
                .with_vision(5 * MB)
                .with_capability(Tools)
                .with_max_output_tokens(64_000)
                .with_temperature_range(0.0, 1.0)
                .with_alias("sonnet"),
            ModelDescriptor::new("anthropic", "claude-3-5-haiku-latest", CostClass::Low, 200_000)
                .with_capability(Tools)
                .with_max_output_tokens(8_192)
                .with_temperature_range(0.0, 1.0)
                .with_alias("haiku"),
            // OpenRouter
            ModelDescriptor::new(
                "openrouter",
                "meta-llama/llama-3.3-70b-instruct:free",
                CostClass::Free,
                131_072,
            )
            .with_alias("llama"),
            ModelDescriptor::new("openrouter", "deepseek/deepseek-r1:free", CostClass::Free, 163_840)
                .with_alias("deepseek-r1"),
            ModelDescriptor::new("openrouter", "openai/gpt-4.1-mini", CostClass::Low, 1_047_576)
                .with_vision(20 * MB)
                .with_capability(Tools)
                .with_alias("gpt4.1-mini"),
            // Azure OpenAI: same model ids, served through deployments
            ModelDescriptor::new("azure", "o3", CostClass::High, 200_000)
                .with_capability(Tools)
                .with_max_output_tokens(100_000)
                .with_fixed_temperature(1.0),
            ModelDescriptor::new("azure", "o3-mini", CostClass::Medium, 200_000)
                .with_capability(Tools)
                .with_max_output_tokens(100_000)
                .with_fixed_temperature(1.0),
            ModelDescriptor::new("azure", "o4-mini", CostClass::Medium, 200_000)
                .with_capability(Tools)
                .with_max_output_tokens(100_000)
                .with_fixed_temperature(1.0),
            ModelDescriptor::new("azure", "gpt-4o", CostClass::Medium, 128_000)
                .with_vision(20 * MB)
                .with_capability(Tools)
                .with_max_output_tokens(16_384)
                .with_temperature_range(0.0, 2.0)
                .with_alias("gpt4o"),
            ModelDescriptor::new("azure", "gpt-4o-mini", CostClass::Low, 128_000)
                .with_vision(20 * MB)
                .with_capability(Tools)
                .with_max_output_tokens(16_384)
                .with_temperature_range(0.0, 2.0)
                .with_alias("gpt4omini"),
            // Requesty router
            ModelDescriptor::new("requesty", "coding/claude-4-sonnet", CostClass::High, 200_000)
                .with_capability(Tools)
                .with_temperature_range(0.0, 1.0)
                .with_alias("claude-4-sonnet"),
            ModelDescriptor::new("requesty", "openai/o3-mini", CostClass::Medium, 200_000)
                .with_capability(Tools)
                .with_fixed_temperature(1.0),
            ModelDescriptor::new("requesty", "mistral/mistral-large-latest", CostClass::Medium, 131_072)
                .with_temperature_range(0.0, 1.0)
                .with_alias("mistral-large"),
            ModelDescriptor::new("requesty", "mistral/devstral-small-latest", CostClass::Low, 131_072)
                .with_temperature_range(0.0, 1.0)
                .with_alias("devstral"),
            ModelDescriptor::new("requesty", "perplexity/sonar", CostClass::Low, 131_072)
                .with_temperature_range(0.0, 1.0)
                .with_alias("sonar"),
        ];
        Self { models }
    }

    /// Add models, replacing any existing entry with the same provider and id.
    pub fn with_models(mut self, extra: impl IntoIterator<Item = ModelDescriptor>) -> Self {
        for model in extra {
            match self
                .models
                .iter_mut()
                .find(|m| m.provider_id == model.provider_id && m.model_id == model.model_id)
            {
                Some(existing) => *existing = model,
                None => self.models.push(model),
            }
        }
        self
    }

    pub fn all(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn for_provider<'a>(&'a self, provider: &'a ProviderId) -> impl Iterator<Item = &'a ModelDescriptor> {
        self.models.iter().filter(move |m| &m.provider_id == provider)
    }

    pub fn get(&self, provider: &ProviderId, model_id: &str) -> Option<&ModelDescriptor> {
        self.models
            .iter()
            .find(|m| &m.provider_id == provider && m.model_id == model_id)
    }

    /// Models a caller-supplied name refers to.
    ///
    /// Matching levels, first non-empty level wins: exact model id, then
    /// `provider/model`, then alias. Comparison ignores ASCII case. A name can
    /// match several providers (the same id served by two vendors).
    pub fn find(&self, name: &str) -> Vec<&ModelDescriptor> {
        let name = name.trim();
        let by_id: Vec<_> = self
            .models
            .iter()
            .filter(|m| m.model_id.eq_ignore_ascii_case(name))
            .collect();
        if !by_id.is_empty() {
            return by_id;
        }

        let by_qualified: Vec<_> = self
            .models
            .iter()
            .filter(|m| m.qualified_name().eq_ignore_ascii_case(name))
            .collect();
        if !by_qualified.is_empty() {
            return by_qualified;
        }

        self.models.iter().filter(|m| m.has_alias(name)).collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
