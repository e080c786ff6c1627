//! Typed tool arguments
//!
//! Raw argument mappings arrive as JSON objects from either transport.
//! [`ToolArguments::validate`] checks them against the tool's declared
//! parameters and extracts the fields the gateway itself interprets.

use super::entities::{Capability, ToolDefinition, params};
use crate::conversation::ContinuationToken;
use crate::core::error::GatewayError;
use serde_json::{Map, Value};

/// What the caller asked for in the `model` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelHint {
    /// Absent, `auto`, or `default`
    Auto,
    /// Capability-class alias (`text`, `vision`, `tools`)
    Capability(Capability),
    /// A concrete model id, alias, or `provider/model` name
    Concrete(String),
}

impl ModelHint {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return ModelHint::Auto;
        };
        match raw.to_ascii_lowercase().as_str() {
            "auto" | "default" => ModelHint::Auto,
            "text" => ModelHint::Capability(Capability::TextGeneration),
            "vision" => ModelHint::Capability(Capability::VisionGeneration),
            "tools" => ModelHint::Capability(Capability::FunctionCalling),
            _ => ModelHint::Concrete(raw.to_string()),
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, ModelHint::Concrete(_))
    }
}

/// Arguments after validation against a [`ToolDefinition`].
#[derive(Debug, Clone, PartialEq)]
pub struct ToolArguments {
    pub prompt: String,
    pub model: ModelHint,
    pub continuation_id: Option<ContinuationToken>,
    pub temperature: Option<f64>,
    /// Host paths, untranslated
    pub files: Vec<String>,
    pub images: Vec<String>,
    /// Tool-specific parameters, passed through to the handler
    pub extra: Map<String, Value>,
}

impl ToolArguments {
    pub fn validate(def: &ToolDefinition, raw: &Map<String, Value>) -> Result<Self, GatewayError> {
        for (key, value) in raw {
            if value.is_null() {
                continue;
            }
            match def.parameter(key) {
                Some(param) if !param.param_type.accepts(value) => {
                    return Err(GatewayError::Argument(format!(
                        "parameter '{}' must be {}",
                        key, param.param_type
                    )));
                }
                Some(_) => {}
                None if key == params::FILES || key == params::IMAGES => {
                    return Err(GatewayError::Argument(format!(
                        "tool '{}' does not accept {}",
                        def.name, key
                    )));
                }
                None => {}
            }
        }

        for param in def.parameters.iter().filter(|p| p.required) {
            if raw.get(&param.name).is_none_or(Value::is_null) {
                return Err(GatewayError::Argument(format!(
                    "missing required parameter '{}'",
                    param.name
                )));
            }
        }

        let prompt = string_arg(raw, params::PROMPT).unwrap_or_default();
        if def.parameter(params::PROMPT).is_some_and(|p| p.required) && prompt.trim().is_empty() {
            return Err(GatewayError::Argument("parameter 'prompt' must not be empty".into()));
        }

        let continuation_id = string_arg(raw, params::CONTINUATION_ID)
            .map(|s| ContinuationToken::parse(&s))
            .transpose()?;

        let temperature = raw.get(params::TEMPERATURE).and_then(Value::as_f64);
        if let Some(t) = temperature
            && !(0.0..=2.0).contains(&t)
        {
            return Err(GatewayError::Argument(format!(
                "parameter 'temperature' must be between 0.0 and 2.0, got {}",
                t
            )));
        }

        let extra = raw
            .iter()
            .filter(|(key, value)| !value.is_null() && !is_reserved(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            prompt,
            model: ModelHint::parse(string_arg(raw, params::MODEL).as_deref()),
            continuation_id,
            temperature,
            files: string_list(raw, params::FILES),
            images: string_list(raw, params::IMAGES),
            extra,
        })
    }
}

fn is_reserved(key: &str) -> bool {
    matches!(
        key,
        params::PROMPT
            | params::MODEL
            | params::CONTINUATION_ID
            | params::TEMPERATURE
            | params::FILES
            | params::IMAGES
    )
}

fn string_arg(raw: &Map<String, Value>, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string_list(raw: &Map<String, Value>, key: &str) -> Vec<String> {
    raw.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
