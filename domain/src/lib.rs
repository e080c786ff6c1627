//! Domain layer for zen-gateway
//!
//! This crate contains the core entities and value objects of the gateway.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Tools
//!
//! A tool is a named operation with capability requirements
//! ([`ToolDefinition`]). The [`ToolRegistry`] is built once at startup and
//! never changes.
//!
//! ## Models
//!
//! Every model the gateway can route to is described by a
//! [`ModelDescriptor`] in the [`ModelCatalog`]. Routing picks one that
//! satisfies the tool's capabilities.
//!
//! ## Conversations
//!
//! A [`ConversationThread`] keeps multi-turn state between separate tool
//! calls, addressed by an opaque [`ContinuationToken`].
//!
//! ## Workspace paths
//!
//! [`PathTranslator`] maps caller paths onto the paths the gateway can read.

pub mod config;
pub mod conversation;
pub mod core;
pub mod generation;
pub mod model;
pub mod tool;
pub mod util;
pub mod workspace;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use conversation::{
    ContextBudget, ContinuationToken, ConversationThread, ConversationTurn, NewTurn, Role,
    ThreadContext,
};
pub use core::error::{ErrorKind, FailureClass, GatewayError};
pub use generation::{ContextMessage, FinishReason, GenerationOutput, GenerationRequest, UsageStats};
pub use model::{CostClass, ModelCatalog, ModelDescriptor, ProviderId, TemperatureConstraint};
pub use tool::{
    arguments::{ModelHint, ToolArguments},
    entities::{Capability, CapabilitySet, ParamType, ToolDefinition, ToolParameter, params},
    registry::ToolRegistry,
    value_objects::{RequestId, ToolRequest, ToolResponse, TransportKind},
};
pub use workspace::{FileKind, FileRef, MountMapping, PathTranslator};
