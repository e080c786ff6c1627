//! Infrastructure layer for zen-gateway
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;
pub mod store;
pub mod tools;

// Re-export commonly used types
pub use config::{ConfigError, ConfigLoader, ConfigSource, FileConfig, FileStoreKind};
pub use logging::JsonlRequestLogger;
pub use providers::{
    HttpProviderClient, ProviderKind, ProviderSettings, build_provider_clients,
};
pub use store::{FileThreadStore, InMemoryThreadStore, open_thread_store};
pub use tools::{GenerationHandler, default_registry, default_tools};
