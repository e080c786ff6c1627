//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[logging]` section.
///
/// Diagnostic logs always go to stderr; these settings add file outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Default filter directive when neither `-v` nor `RUST_LOG` is given
    /// (e.g. "info", "gateway_application=debug").
    pub level: Option<String>,
    /// Directory for a daily-rotated copy of the diagnostic log.
    pub dir: Option<PathBuf>,
    /// JSONL file receiving one audit record per tool request.
    pub request_log: Option<PathBuf>,
}
