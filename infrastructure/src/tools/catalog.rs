//! Built-in tool catalog

use gateway_domain::{Capability, ToolDefinition, ToolParameter, ToolRegistry};

/// Definitions of every tool the gateway exposes.
pub fn default_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "chat",
            "General conversation and quick questions with a second model",
            [Capability::TextGeneration],
        )
        .accepting_files(),
        ToolDefinition::new(
            "thinkdeep",
            "Extended reasoning over a hard problem or design decision",
            [Capability::TextGeneration],
        )
        .accepting_files()
        .with_parameter(ToolParameter::new(
            "focus_areas",
            "Aspects to concentrate on (e.g. performance, security)",
            false,
        )),
        ToolDefinition::new(
            "codereview",
            "Review code for bugs, security issues and maintainability",
            [Capability::TextGeneration],
        )
        .accepting_files()
        .with_parameter(ToolParameter::new(
            "review_type",
            "full, security, performance or quick",
            false,
        )),
        ToolDefinition::new(
            "analyze",
            "Explain the structure and behavior of existing code",
            [Capability::TextGeneration],
        )
        .accepting_files()
        .with_parameter(ToolParameter::new(
            "analysis_type",
            "architecture, performance, security, quality or general",
            false,
        )),
        ToolDefinition::new(
            "debug",
            "Root-cause analysis of errors and unexpected behavior",
            [Capability::TextGeneration],
        )
        .accepting_files()
        .with_parameter(ToolParameter::new(
            "error_context",
            "Stack traces, logs or failing output",
            false,
        )),
        ToolDefinition::new(
            "docgen",
            "Write documentation for the given code",
            [Capability::TextGeneration],
        )
        .accepting_files(),
        ToolDefinition::new(
            "consensus",
            "Get an independent opinion to weigh against your own",
            [Capability::TextGeneration],
        )
        .accepting_files()
        .with_parameter(ToolParameter::new(
            "stance",
            "for, against or neutral",
            false,
        )),
        ToolDefinition::new(
            "seer",
            "Questions about screenshots, diagrams and other images",
            [Capability::VisionGeneration],
        )
        .accepting_files()
        .accepting_images(),
        ToolDefinition::new(
            "refactor",
            "Propose structured refactorings of the given code",
            [Capability::TextGeneration, Capability::FunctionCalling],
        )
        .accepting_files()
        .with_parameter(ToolParameter::new(
            "refactor_type",
            "codesmells, decompose, modernize or organization",
            false,
        )),
    ]
}

/// Registry over [`default_tools`].
pub fn default_registry() -> ToolRegistry {
    ToolRegistry::new(default_tools())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_domain::{GatewayError, params};

    #[test]
    fn test_catalog_contents() {
        let registry = default_registry();
        let names: Vec<&str> = registry.names().collect();
        for expected in [
            "chat",
            "thinkdeep",
            "codereview",
            "analyze",
            "debug",
            "docgen",
            "consensus",
            "seer",
            "refactor",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
        assert_eq!(registry.len(), 9);
    }

    #[test]
    fn test_capability_requirements() {
        let registry = default_registry();

        let seer = registry.resolve("seer").unwrap();
        assert!(seer.requires(Capability::VisionGeneration));
        assert!(seer.accepts_images);

        let refactor = registry.resolve("refactor").unwrap();
        assert!(refactor.requires(Capability::TextGeneration));
        assert!(refactor.requires(Capability::FunctionCalling));
        assert!(!refactor.accepts_images);

        let chat = registry.resolve("chat").unwrap();
        assert!(chat.accepts_files);
        assert!(chat.parameter(params::PROMPT).unwrap().required);
    }

    #[test]
    fn test_unknown_tool() {
        assert!(matches!(
            default_registry().resolve("listmodels"),
            Err(GatewayError::UnknownTool(_))
        ));
    }
}
