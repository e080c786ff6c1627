//! Tool domain
//!
//! - [`entities`]: capabilities, parameters and [`ToolDefinition`](entities::ToolDefinition)
//! - [`registry`]: the immutable catalog of definitions
//! - [`arguments`]: validation of raw argument mappings
//! - [`value_objects`]: transport-independent request and response

pub mod arguments;
pub mod entities;
pub mod registry;
pub mod value_objects;
