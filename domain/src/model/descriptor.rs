//! Model descriptors

use crate::tool::entities::{Capability, CapabilitySet};
use serde::{Deserialize, Serialize};

/// Identifier of a configured upstream provider (e.g. "openai", "gemini").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProviderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Relative price tier, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostClass {
    Free,
    Low,
    Medium,
    High,
    Premium,
}

impl CostClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostClass::Free => "free",
            CostClass::Low => "low",
            CostClass::Medium => "medium",
            CostClass::High => "high",
            CostClass::Premium => "premium",
        }
    }
}

/// Sampling temperatures a model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TemperatureConstraint {
    /// Only the vendor default is accepted, so the parameter is never sent.
    Fixed { value: f64 },
    /// Requests are clamped into `min..=max`.
    Range { min: f64, max: f64 },
}

impl TemperatureConstraint {
    /// Temperature to send for a requested value, or `None` to omit it.
    pub fn apply(&self, requested: f64) -> Option<f64> {
        match *self {
            TemperatureConstraint::Fixed { .. } => None,
            TemperatureConstraint::Range { min, max } => Some(requested.max(min).min(max)),
        }
    }
}

/// A concrete model offered by one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub provider_id: ProviderId,
    pub model_id: String,
    pub capabilities: CapabilitySet,
    pub cost_class: CostClass,
    /// Context window size in tokens
    pub context_window: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Largest accepted image attachment in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_image_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<TemperatureConstraint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl ModelDescriptor {
    /// Text-only descriptor; add more with [`ModelDescriptor::with_capability`].
    pub fn new(
        provider_id: impl Into<String>,
        model_id: impl Into<String>,
        cost_class: CostClass,
        context_window: u64,
    ) -> Self {
        Self {
            provider_id: ProviderId::new(provider_id),
            model_id: model_id.into(),
            capabilities: CapabilitySet::new().with(Capability::TextGeneration),
            cost_class,
            context_window,
            max_output_tokens: None,
            max_image_bytes: None,
            temperature: None,
            aliases: Vec::new(),
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Vision support with an image size limit.
    pub fn with_vision(self, max_image_bytes: u64) -> Self {
        let mut model = self.with_capability(Capability::VisionGeneration);
        model.max_image_bytes = Some(max_image_bytes);
        model
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    /// Reasoning models that only run at their default temperature.
    pub fn with_fixed_temperature(mut self, value: f64) -> Self {
        self.temperature = Some(TemperatureConstraint::Fixed { value });
        self
    }

    pub fn with_temperature_range(mut self, min: f64, max: f64) -> Self {
        self.temperature = Some(TemperatureConstraint::Range { min, max });
        self
    }

    /// Temperature to put on the wire for this model.
    pub fn temperature_for(&self, requested: Option<f64>) -> Option<f64> {
        let requested = requested?;
        match &self.temperature {
            Some(constraint) => constraint.apply(requested),
            None => Some(requested),
        }
    }

    pub fn satisfies(&self, required: &CapabilitySet) -> bool {
        self.capabilities.satisfies(required)
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// `provider/model`, unique across the catalog.
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.provider_id, self.model_id)
    }

    pub fn has_alias(&self, name: &str) -> bool {
        self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}
