//! Routing preferences.

use gateway_domain::ProviderId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Static inputs of the [`ModelRouter`](crate::use_cases::model_router::ModelRouter).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Provider preference order. Configured providers missing from this list
    /// are tried afterwards in name order.
    pub preference: Vec<ProviderId>,
    /// Model tried first whenever vision is required.
    pub default_vision_model: Option<String>,
    /// Per-provider allow-lists of model ids or aliases. A provider without an
    /// entry may serve every catalog model.
    pub allowed_models: HashMap<ProviderId, Vec<String>>,
}

impl RouterConfig {
    pub fn with_preference(mut self, preference: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.preference = preference.into_iter().map(|p| ProviderId::new(p)).collect();
        self
    }

    pub fn with_default_vision_model(mut self, model: impl Into<String>) -> Self {
        self.default_vision_model = Some(model.into());
        self
    }

    pub fn with_allowed_models(
        mut self,
        provider: impl Into<String>,
        models: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.allowed_models.insert(
            ProviderId::new(provider),
            models.into_iter().map(Into::into).collect(),
        );
        self
    }
}
