//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod provider_client;
pub mod request_logger;
pub mod thread_store;
pub mod tool_handler;
