//! Conversation configuration from TOML (`[conversation]` section)

use gateway_application::ConversationConfig;
use gateway_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Where threads are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStoreKind {
    /// One JSON document per thread; survives restarts
    #[default]
    File,
    /// Process-local; lost on exit
    Memory,
}

/// `[conversation]` section.
///
/// ```toml
/// [conversation]
/// max_turns = 40
/// ttl_secs = 7200
/// store = "file"
/// store_dir = "/var/lib/zen-gateway/threads"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConversationConfig {
    pub max_turns: usize,
    /// Inactivity period after which a thread expires.
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
    /// Hard cap on replayed history in bytes.
    pub max_context_bytes: usize,
    /// Share of the model's context window given to history, in (0, 1].
    pub history_ratio: f64,
    pub store: FileStoreKind,
    /// Directory of the file store (default: platform data dir).
    pub store_dir: Option<PathBuf>,
}

impl Default for FileConversationConfig {
    fn default() -> Self {
        let defaults = ConversationConfig::default();
        Self {
            max_turns: defaults.max_turns,
            ttl_secs: defaults.ttl.as_secs(),
            sweep_interval_secs: defaults.sweep_interval.as_secs(),
            max_context_bytes: defaults.max_context_bytes,
            history_ratio: defaults.history_ratio,
            store: FileStoreKind::default(),
            store_dir: None,
        }
    }
}

impl FileConversationConfig {
    /// Convert to [`ConversationConfig`], returning validation issues.
    ///
    /// Invalid values are reported as errors and replaced by defaults.
    pub fn to_conversation_config(&self) -> (ConversationConfig, Vec<ConfigIssue>) {
        let defaults = ConversationConfig::default();
        let mut issues = Vec::new();
        let mut invalid = |message: String| {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidConversationLimits,
                message,
            ));
        };

        // A continued thread needs room for a user and an assistant turn
        let max_turns = if self.max_turns < 2 {
            invalid(format!(
                "conversation.max_turns must be at least 2 (got {})",
                self.max_turns
            ));
            defaults.max_turns
        } else {
            self.max_turns
        };
        let ttl = if self.ttl_secs == 0 {
            invalid("conversation.ttl_secs must be positive".to_string());
            defaults.ttl
        } else {
            Duration::from_secs(self.ttl_secs)
        };
        let sweep_interval = if self.sweep_interval_secs == 0 {
            invalid("conversation.sweep_interval_secs must be positive".to_string());
            defaults.sweep_interval
        } else {
            Duration::from_secs(self.sweep_interval_secs)
        };
        let history_ratio = if self.history_ratio > 0.0 && self.history_ratio <= 1.0 {
            self.history_ratio
        } else {
            invalid(format!(
                "conversation.history_ratio must be in (0, 1] (got {})",
                self.history_ratio
            ));
            defaults.history_ratio
        };

        let config = ConversationConfig::default()
            .with_max_turns(max_turns)
            .with_ttl(ttl)
            .with_sweep_interval(sweep_interval)
            .with_max_context_bytes(self.max_context_bytes)
            .with_history_ratio(history_ratio);
        (config, issues)
    }

    /// Configured store directory, or `<data dir>/zen-gateway/threads`.
    pub fn store_dir(&self) -> PathBuf {
        self.store_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("zen-gateway")
                .join("threads")
        })
    }
}
