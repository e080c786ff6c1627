//! Model Router use case.
//!
//! Picks a concrete model and provider client that satisfy a tool's
//! capability requirements.
//!
//! # Selection
//!
//! 1. A concrete model hint must resolve (id, `provider/model`, or alias) to
//!    a catalog model that satisfies the requirements and whose provider is
//!    configured and allows it. Otherwise `ModelNotFound`; the hint is never
//!    swapped for a different model.
//! 2. Otherwise (no hint, `auto`, `default`, or a capability-class alias)
//!    providers are visited in preference order and each contributes its
//!    best qualifying model, ranked by how many capabilities it offers
//!    (desc), cost class (asc), context window (desc), then model id.
//! 3. Nothing qualifies → `NoAvailableModel`.
//!
//! [`ModelRouter::candidates`] returns the whole ordered fallback list used
//! by the retry path; [`ModelRouter::select`] returns its head.

use crate::config::RouterConfig;
use crate::ports::provider_client::ProviderClient;
use gateway_domain::{
    Capability, CapabilitySet, GatewayError, ModelCatalog, ModelDescriptor, ModelHint, ProviderId,
};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A routing decision: model plus the client that serves it.
#[derive(Clone)]
pub struct Route {
    pub model: ModelDescriptor,
    pub client: Arc<dyn ProviderClient>,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("model", &self.model.qualified_name())
            .finish()
    }
}

/// Availability of one catalog model, as reported by `models/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelAvailability {
    #[serde(flatten)]
    pub model: ModelDescriptor,
    /// Whether the provider has a client (credential) configured
    pub configured: bool,
    /// Whether the provider's allow-list permits this model
    pub allowed: bool,
}

impl ModelAvailability {
    pub fn is_available(&self) -> bool {
        self.configured && self.allowed
    }
}

pub struct ModelRouter {
    catalog: ModelCatalog,
    clients: HashMap<ProviderId, Arc<dyn ProviderClient>>,
    /// Configured providers in routing order
    order: Vec<ProviderId>,
    config: RouterConfig,
}

impl ModelRouter {
    pub fn new(
        catalog: ModelCatalog,
        clients: Vec<Arc<dyn ProviderClient>>,
        config: RouterConfig,
    ) -> Self {
        let clients: HashMap<ProviderId, Arc<dyn ProviderClient>> = clients
            .into_iter()
            .map(|c| (c.provider_id().clone(), c))
            .collect();

        let mut order: Vec<ProviderId> = Vec::new();
        for provider in &config.preference {
            if clients.contains_key(provider) && !order.contains(provider) {
                order.push(provider.clone());
            }
        }
        let mut rest: Vec<ProviderId> = clients
            .keys()
            .filter(|p| !order.contains(p))
            .cloned()
            .collect();
        rest.sort();
        order.extend(rest);

        Self {
            catalog,
            clients,
            order,
            config,
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Configured providers in routing order.
    pub fn providers(&self) -> &[ProviderId] {
        &self.order
    }

    /// Best route for the request.
    pub fn select(
        &self,
        required: &CapabilitySet,
        hint: &ModelHint,
    ) -> Result<Route, GatewayError> {
        self.candidates(required, hint, None)?
            .into_iter()
            .next()
            .ok_or_else(|| no_available(required))
    }

    /// Ordered fallback list for the request; never empty on success.
    ///
    /// `inherited` is the `(provider, model)` of the previous assistant turn
    /// of a continued thread. It is preferred under automatic selection when
    /// still available, but unlike an explicit hint it may fall back.
    pub fn candidates(
        &self,
        required: &CapabilitySet,
        hint: &ModelHint,
        inherited: Option<(&str, &str)>,
    ) -> Result<Vec<Route>, GatewayError> {
        match hint {
            ModelHint::Concrete(name) => self.explicit_candidates(required, name),
            ModelHint::Capability(capability) => {
                let required = required.clone().with(*capability);
                self.automatic_candidates(&required, None)
            }
            ModelHint::Auto => self.automatic_candidates(required, inherited),
        }
    }

    fn explicit_candidates(
        &self,
        required: &CapabilitySet,
        name: &str,
    ) -> Result<Vec<Route>, GatewayError> {
        let mut matches: Vec<&ModelDescriptor> = self
            .catalog
            .find(name)
            .into_iter()
            .filter(|m| m.satisfies(required) && self.is_available(m))
            .collect();
        matches.sort_by_key(|m| self.provider_rank(&m.provider_id));

        let routes: Vec<Route> = matches.into_iter().filter_map(|m| self.route(m)).collect();
        if routes.is_empty() {
            return Err(GatewayError::ModelNotFound(format!(
                "'{}' is not an available model supporting {}",
                name, required
            )));
        }
        debug!(model = %name, resolved = %routes[0].model.qualified_name(), "Resolved explicit model");
        Ok(routes)
    }

    fn automatic_candidates(
        &self,
        required: &CapabilitySet,
        inherited: Option<(&str, &str)>,
    ) -> Result<Vec<Route>, GatewayError> {
        let mut ordered: Vec<&ModelDescriptor> = Vec::new();

        if let Some((provider, model_id)) = inherited
            && let Some(model) = self.catalog.get(&ProviderId::from(provider), model_id)
            && model.satisfies(required)
            && self.is_available(model)
        {
            ordered.push(model);
        }

        if required.contains(Capability::VisionGeneration)
            && let Some(name) = &self.config.default_vision_model
            && let Some(model) = self
                .catalog
                .find(name)
                .into_iter()
                .filter(|m| m.satisfies(required) && self.is_available(m))
                .min_by_key(|m| self.provider_rank(&m.provider_id))
        {
            ordered.push(model);
        }

        let ranked: Vec<Vec<&ModelDescriptor>> = self
            .order
            .iter()
            .map(|provider| self.ranked_models(provider, required))
            .collect();

        // Best model of every provider first, then the rest.
        ordered.extend(ranked.iter().filter_map(|models| models.first().copied()));
        ordered.extend(ranked.iter().flat_map(|models| models.iter().skip(1).copied()));

        let mut routes: Vec<Route> = Vec::with_capacity(ordered.len());
        for model in ordered {
            let duplicate = routes.iter().any(|r| {
                r.model.provider_id == model.provider_id && r.model.model_id == model.model_id
            });
            if !duplicate && let Some(route) = self.route(model) {
                routes.push(route);
            }
        }

        if routes.is_empty() {
            return Err(no_available(required));
        }
        debug!(
            required = %required,
            first = %routes[0].model.qualified_name(),
            candidates = routes.len(),
            "Automatic model selection"
        );
        Ok(routes)
    }

    /// Qualifying models of one provider, best first.
    fn ranked_models<'a>(
        &'a self,
        provider: &'a ProviderId,
        required: &CapabilitySet,
    ) -> Vec<&'a ModelDescriptor> {
        let mut models: Vec<&'a ModelDescriptor> = self
            .catalog
            .for_provider(provider)
            .filter(|m| m.satisfies(required) && self.is_allowed(m))
            .collect();
        models.sort_by(|a, b| {
            let key = |m: &ModelDescriptor| {
                (
                    Reverse(m.capabilities.len()),
                    m.cost_class,
                    Reverse(m.context_window),
                )
            };
            key(a).cmp(&key(b)).then_with(|| a.model_id.cmp(&b.model_id))
        });
        models
    }

    fn route(&self, model: &ModelDescriptor) -> Option<Route> {
        self.clients.get(&model.provider_id).map(|client| Route {
            model: model.clone(),
            client: Arc::clone(client),
        })
    }

    fn provider_rank(&self, provider: &ProviderId) -> usize {
        self.order
            .iter()
            .position(|p| p == provider)
            .unwrap_or(usize::MAX)
    }

    fn is_allowed(&self, model: &ModelDescriptor) -> bool {
        match self.config.allowed_models.get(&model.provider_id) {
            Some(allowed) => allowed
                .iter()
                .any(|name| model.model_id.eq_ignore_ascii_case(name) || model.has_alias(name)),
            None => true,
        }
    }

    fn is_available(&self, model: &ModelDescriptor) -> bool {
        self.clients.contains_key(&model.provider_id) && self.is_allowed(model)
    }

    /// Every catalog model with its availability, configured providers first.
    pub fn availability(&self) -> Vec<ModelAvailability> {
        let mut models: Vec<ModelAvailability> = self
            .catalog
            .all()
            .iter()
            .map(|model| ModelAvailability {
                configured: self.clients.contains_key(&model.provider_id),
                allowed: self.is_allowed(model),
                model: model.clone(),
            })
            .collect();
        models.sort_by(|a, b| {
            self.provider_rank(&a.model.provider_id)
                .cmp(&self.provider_rank(&b.model.provider_id))
                .then_with(|| a.model.provider_id.cmp(&b.model.provider_id))
                .then_with(|| a.model.model_id.cmp(&b.model.model_id))
        });
        models
    }
}

fn no_available(required: &CapabilitySet) -> GatewayError {
    GatewayError::NoAvailableModel(format!(
        "no configured provider offers a model supporting {}",
        required
    ))
}
