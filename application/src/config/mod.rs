//! Application-level configuration.
//!
//! These types control how use cases behave:
//!
//! - [`RouterConfig`]: provider preference, default vision model, allow-lists
//! - [`ConversationConfig`]: thread size, lifetime and replay budget
//! - [`RetryPolicy`]: bounded backoff for transient provider failures

pub mod conversation_config;
pub mod retry_policy;
pub mod router_config;

pub use conversation_config::ConversationConfig;
pub use retry_policy::RetryPolicy;
pub use router_config::RouterConfig;
