//! Tool domain entities

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeSet;

/// Well-known parameter names shared by every tool.
pub mod params {
    pub const PROMPT: &str = "prompt";
    pub const MODEL: &str = "model";
    pub const CONTINUATION_ID: &str = "continuation_id";
    pub const TEMPERATURE: &str = "temperature";
    pub const FILES: &str = "files";
    pub const IMAGES: &str = "images";
}

/// Generation capability a tool may require and a model may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    TextGeneration,
    VisionGeneration,
    FunctionCalling,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::TextGeneration => "text_generation",
            Capability::VisionGeneration => "vision_generation",
            Capability::FunctionCalling => "function_calling",
        }
    }

    pub fn all() -> &'static [Capability] {
        &[
            Capability::TextGeneration,
            Capability::VisionGeneration,
            Capability::FunctionCalling,
        ]
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.0.insert(capability);
        self
    }

    pub fn insert(&mut self, capability: Capability) -> bool {
        self.0.insert(capability)
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// True when every capability in `required` is present.
    pub fn satisfies(&self, required: &CapabilitySet) -> bool {
        self.0.is_superset(&required.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|c| c.as_str()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// Declared type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    StringArray,
    Object,
}

impl ParamType {
    /// JSON Schema type name
    pub fn json_type(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
            ParamType::StringArray => "array",
            ParamType::Object => "object",
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Number => value.is_number(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            ParamType::Object => value.is_object(),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            ParamType::StringArray => "an array of strings",
            ParamType::Integer => "an integer",
            ParamType::Object => "an object",
            ParamType::Boolean => "a boolean",
            ParamType::Number => "a number",
            ParamType::String => "a string",
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// Parameter specification for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    pub param_type: ParamType,
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: ParamType::String,
        }
    }

    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = param_type;
        self
    }
}

/// Definition of a tool exposed by the gateway.
///
/// Built once at startup and never mutated afterwards. Every definition
/// carries the shared parameters (`prompt`, `model`, `continuation_id`,
/// `temperature`); `files` and `images` are only declared when the tool
/// accepts them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "chat")
    pub name: String,
    /// Human-readable description
    pub description: String,
    pub required_capabilities: CapabilitySet,
    pub accepts_files: bool,
    pub accepts_images: bool,
    /// Parameter specifications
    pub parameters: Vec<ToolParameter>,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required_capabilities: capabilities.into_iter().collect(),
            accepts_files: false,
            accepts_images: false,
            parameters: vec![
                ToolParameter::new(params::PROMPT, "Instructions or question for the model", true),
                ToolParameter::new(
                    params::MODEL,
                    "Model name, alias, or 'auto' for automatic selection",
                    false,
                ),
                ToolParameter::new(
                    params::CONTINUATION_ID,
                    "Token returned by a previous call, to continue that conversation",
                    false,
                ),
                ToolParameter::new(params::TEMPERATURE, "Sampling temperature (0.0 - 2.0)", false)
                    .with_type(ParamType::Number),
            ],
        }
    }

    pub fn accepting_files(mut self) -> Self {
        if !self.accepts_files {
            self.accepts_files = true;
            self.parameters.push(
                ToolParameter::new(params::FILES, "Absolute host paths of files to include", false)
                    .with_type(ParamType::StringArray),
            );
        }
        self
    }

    pub fn accepting_images(mut self) -> Self {
        if !self.accepts_images {
            self.accepts_images = true;
            self.parameters.push(
                ToolParameter::new(params::IMAGES, "Absolute host paths of images to include", false)
                    .with_type(ParamType::StringArray),
            );
        }
        self
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.retain(|p| p.name != param.name);
        self.parameters.push(param);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn requires(&self, capability: Capability) -> bool {
        self.required_capabilities.contains(capability)
    }

    /// JSON Schema for the tool's arguments, as reported by `tools/list`.
    pub fn input_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        for param in &self.parameters {
            let mut schema = json!({
                "type": param.param_type.json_type(),
                "description": param.description,
            });
            if param.param_type == ParamType::StringArray {
                schema["items"] = json!({ "type": "string" });
            }
            properties.insert(param.name.clone(), schema);
        }
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_set_satisfies() {
        let model: CapabilitySet = [Capability::TextGeneration, Capability::VisionGeneration]
            .into_iter()
            .collect();
        let text = CapabilitySet::new().with(Capability::TextGeneration);
        let tools = text.clone().with(Capability::FunctionCalling);

        assert!(model.satisfies(&text));
        assert!(!model.satisfies(&tools));
        assert!(model.satisfies(&CapabilitySet::new()));
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn test_capability_set_serializes_as_list() {
        let set: CapabilitySet = [Capability::VisionGeneration, Capability::TextGeneration]
            .into_iter()
            .collect();
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json, json!(["text_generation", "vision_generation"]));
    }

    #[test]
    fn test_param_type_accepts() {
        assert!(ParamType::String.accepts(&json!("x")));
        assert!(!ParamType::String.accepts(&json!(1)));
        assert!(ParamType::Number.accepts(&json!(0.5)));
        assert!(ParamType::Integer.accepts(&json!(3)));
        assert!(!ParamType::Integer.accepts(&json!(3.5)));
        assert!(ParamType::StringArray.accepts(&json!(["a", "b"])));
        assert!(!ParamType::StringArray.accepts(&json!(["a", 1])));
        assert!(!ParamType::StringArray.accepts(&json!("a")));
    }

    #[test]
    fn test_definition_declares_shared_parameters() {
        let def = ToolDefinition::new("chat", "General chat", [Capability::TextGeneration]);
        assert!(def.parameter(params::PROMPT).is_some_and(|p| p.required));
        assert!(def.parameter(params::MODEL).is_some());
        assert!(def.parameter(params::CONTINUATION_ID).is_some());
        assert!(def.parameter(params::FILES).is_none());
        assert!(!def.accepts_files);
    }

    #[test]
    fn test_accepting_files_is_idempotent() {
        let def = ToolDefinition::new("analyze", "Analyze code", [Capability::TextGeneration])
            .accepting_files()
            .accepting_files();
        assert!(def.accepts_files);
        let count = def.parameters.iter().filter(|p| p.name == params::FILES).count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_input_schema() {
        let def = ToolDefinition::new("seer", "Look at images", [Capability::VisionGeneration])
            .accepting_images();
        let schema = def.input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["prompt"]));
        assert_eq!(schema["properties"]["images"]["type"], "array");
        assert_eq!(schema["properties"]["images"]["items"]["type"], "string");
        assert_eq!(schema["properties"]["temperature"]["type"], "number");
    }
}
