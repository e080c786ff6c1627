//! Output formatter trait

use gateway_application::DispatchError;
use gateway_domain::ToolResponse;

/// Trait for rendering one-shot CLI results
pub trait OutputFormatter {
    /// Render a successful tool response
    fn format_response(&self, response: &ToolResponse) -> String;

    /// Render a failed dispatch
    fn format_error(&self, error: &DispatchError) -> String;
}
