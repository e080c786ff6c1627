//! Provider client port
//!
//! Defines the uniform generation interface over upstream model vendors.
//! Implementations (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use gateway_domain::{GatewayError, GenerationOutput, GenerationRequest, ModelDescriptor, ProviderId};
use std::time::Duration;

/// Client for one configured upstream provider.
///
/// `generate` must fail with [`GatewayError::Provider`] tagged transient for
/// timeouts, rate limits, upstream 5xx and connection failures, and
/// permanent for everything else the vendor rejects. Invalid attachments are
/// reported as [`GatewayError::InvalidAttachment`] before any network call.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    fn provider_id(&self) -> &ProviderId;

    /// Upper bound for a single `generate` call.
    fn timeout(&self) -> Duration;

    async fn generate(
        &self,
        model: &ModelDescriptor,
        request: &GenerationRequest,
    ) -> Result<GenerationOutput, GatewayError>;
}
