//! Configuration validation issues.
//!
//! Validation never aborts on the first problem: it collects every
//! [`ConfigIssue`] so the caller can log warnings and refuse to start only
//! when an [`Severity::Error`] is present.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A provider name that no client variant implements
    UnknownProvider,
    /// Provider listed in the preference order but no credential found
    MissingCredential,
    /// `models.default_vision` does not name a catalog model
    UnknownDefaultVisionModel,
    /// `models.default_vision` names a model without vision support
    DefaultVisionWithoutVision,
    /// An allow-list entry that matches no catalog model of that provider
    UnknownAllowedModel,
    /// Mount roots must be absolute
    InvalidMount,
    /// Zero max turns, zero TTL, or a history ratio outside (0, 1]
    InvalidConversationLimits,
    /// Zero attempts or base delay above max delay
    InvalidRetryPolicy,
    /// No provider has a credential; every request will fail routing
    NoUsableProvider,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
