//! Port for structured request logging.
//!
//! Defines the [`RequestLogger`] trait for recording one audit record per
//! dispatched tool request (tool, model, outcome, timing).
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures a
//! machine-readable request history (JSONL).

use serde_json::Value;

/// A structured request event for logging.
pub struct RequestEvent {
    /// Event type identifier (e.g., "tool_completed", "tool_failed").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl RequestEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging request events.
///
/// `log` is synchronous and infallible; logging failures never affect the
/// request being logged.
pub trait RequestLogger: Send + Sync {
    fn log(&self, event: RequestEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoRequestLogger;

impl RequestLogger for NoRequestLogger {
    fn log(&self, _event: RequestEvent) {}
}
