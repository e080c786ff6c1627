//! Retry configuration from TOML (`[retry]` section)

use gateway_application::RetryPolicy;
use gateway_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[retry]` section: fallback attempts on transient provider failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    /// Total attempts across candidates, including the first.
    pub max_attempts: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
        }
    }
}

impl FileRetryConfig {
    /// Convert to [`RetryPolicy`]; an invalid section yields the default
    /// policy plus an error issue.
    pub fn to_retry_policy(&self) -> (RetryPolicy, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        if self.max_attempts == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidRetryPolicy,
                "retry.max_attempts must be at least 1",
            ));
        }
        if self.base_delay_ms > self.max_delay_ms {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidRetryPolicy,
                format!(
                    "retry.base_delay_ms ({}) exceeds retry.max_delay_ms ({})",
                    self.base_delay_ms, self.max_delay_ms
                ),
            ));
        }
        if !issues.is_empty() {
            return (RetryPolicy::default(), issues);
        }

        let policy = RetryPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_delays(
                Duration::from_millis(self.base_delay_ms),
                Duration::from_millis(self.max_delay_ms),
            );
        (policy, issues)
    }
}
