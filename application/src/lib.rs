//! Application layer for zen-gateway
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{ConversationConfig, RetryPolicy, RouterConfig};
pub use ports::{
    provider_client::ProviderClient,
    request_logger::{NoRequestLogger, RequestEvent, RequestLogger},
    thread_store::{StoreError, ThreadStore},
    tool_handler::{ToolHandler, ToolInvocation, ToolOutput},
};
pub use use_cases::conversation::ConversationManager;
pub use use_cases::dispatch::{DispatchError, ExecutionDispatcher};
pub use use_cases::model_router::{ModelAvailability, ModelRouter, Route};
