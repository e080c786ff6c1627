//! Conversation limits: thread size, lifetime and replay budget.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Limits enforced by the
/// [`ConversationManager`](crate::use_cases::conversation::ConversationManager).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Maximum number of turns a thread may hold.
    pub max_turns: usize,
    /// Inactivity period after which a thread expires.
    pub ttl: Duration,
    /// How often the background sweep runs.
    pub sweep_interval: Duration,
    /// Hard cap on replayed history, in bytes.
    pub max_context_bytes: usize,
    /// Share of a model's context window given to history.
    pub history_ratio: f64,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_turns: 50,
            ttl: Duration::from_secs(3 * 60 * 60),
            sweep_interval: Duration::from_secs(5 * 60),
            max_context_bytes: 400_000,
            history_ratio: 0.5,
        }
    }
}

impl ConversationConfig {
    // ==================== Builder Methods ====================

    pub fn with_max_turns(mut self, max: usize) -> Self {
        self.max_turns = max;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_max_context_bytes(mut self, bytes: usize) -> Self {
        self.max_context_bytes = bytes;
        self
    }

    pub fn with_history_ratio(mut self, ratio: f64) -> Self {
        self.history_ratio = ratio;
        self
    }
}
