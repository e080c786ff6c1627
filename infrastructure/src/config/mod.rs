//! Configuration file loading for zen-gateway
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `ZEN_GATEWAY_*` environment variables (`__` separates nested keys)
//! 2. `--config <path>` specified file
//! 3. Project root: `./zen-gateway.toml` or `./.zen-gateway.toml`
//! 4. Global: `<config dir>/zen-gateway/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileConfig, FileConversationConfig, FileLoggingConfig, FileModelsConfig, FileMountConfig,
    FileProviderConfig, FileProvidersConfig, FileRetryConfig, FileStoreKind,
};
pub use loader::{ConfigLoader, ConfigSource};

use thiserror::Error;

/// Errors raised while turning configuration into running components.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Failed to set up HTTP client for provider '{provider}': {message}")]
    HttpClient { provider: String, message: String },

    #[error("Failed to prepare thread store at {path}: {message}")]
    Store { path: String, message: String },
}
