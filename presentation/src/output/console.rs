//! Console output formatters for tool results
//!
//! Both modes carry the same content: the model text, which model answered,
//! token usage and the continuation token to pass on the next call.

use crate::output::formatter::OutputFormatter;
use crate::protocol::cli::OutputMode;
use gateway_application::DispatchError;
use gateway_domain::ToolResponse;
use serde_json::json;

/// Plain-text rendering for people
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn format(response: &ToolResponse) -> String {
        let mut output = String::new();
        output.push_str(response.content.trim_end());
        output.push_str("\n\n---\n");
        output.push_str(&format!(
            "model: {}/{} | tokens: {} in, {} out | finish: {}\n",
            response.provider_id,
            response.model_id,
            response.usage.input_tokens,
            response.usage.output_tokens,
            response.finish_reason.as_str()
        ));
        if response.dropped_turns > 0 {
            output.push_str(&format!(
                "note: {} earlier turn(s) left out of the context\n",
                response.dropped_turns
            ));
        }
        output.push_str(&format!("continuation_id: {}\n", response.continuation_id));
        output
    }

    pub fn format_error(error: &DispatchError) -> String {
        let mut output = format!("error [{}]: {}\n", error.error.kind(), error.error);
        if let Some(token) = &error.continuation_id {
            output.push_str(&format!("continuation_id: {}\n", token));
        }
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_response(&self, response: &ToolResponse) -> String {
        Self::format(response)
    }

    fn format_error(&self, error: &DispatchError) -> String {
        Self::format_error(error)
    }
}

/// Machine-readable rendering, one JSON document per result
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_response(&self, response: &ToolResponse) -> String {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_error(&self, error: &DispatchError) -> String {
        let mut body = json!({
            "kind": error.error.kind().as_str(),
            "message": error.error.to_string(),
        });
        if matches!(error.error, gateway_domain::GatewayError::Provider { .. }) {
            body["transient"] = json!(error.error.is_transient());
        }
        if let Some(token) = &error.continuation_id {
            body["continuation_id"] = json!(token.as_str());
        }
        serde_json::to_string_pretty(&json!({ "error": body })).unwrap_or_else(|_| "{}".to_string())
    }
}

pub fn formatter_for(mode: OutputMode) -> Box<dyn OutputFormatter> {
    match mode {
        OutputMode::Human => Box::new(ConsoleFormatter),
        OutputMode::Json => Box::new(JsonFormatter),
    }
}
