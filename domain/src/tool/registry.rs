//! Read-only tool catalog.

use super::entities::ToolDefinition;
use crate::core::error::GatewayError;
use std::collections::BTreeMap;

/// Catalog of tool definitions, keyed by name.
///
/// Constructed once at startup; there is no mutating API. Tool names are
/// matched exactly, aliases are not supported.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolDefinition>,
}

impl ToolRegistry {
    /// Build a registry. A later definition replaces an earlier one with the
    /// same name.
    pub fn new(definitions: impl IntoIterator<Item = ToolDefinition>) -> Self {
        let tools = definitions
            .into_iter()
            .map(|def| (def.name.clone(), def))
            .collect();
        Self { tools }
    }

    pub fn resolve(&self, name: &str) -> Result<&ToolDefinition, GatewayError> {
        self.tools
            .get(name)
            .ok_or_else(|| GatewayError::UnknownTool(name.to_string()))
    }

    /// All definitions in name order.
    pub fn list(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
