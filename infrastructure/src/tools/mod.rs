//! Tool catalog and the built-in generation handler

mod catalog;
mod generation;

pub use catalog::{default_registry, default_tools};
pub use generation::GenerationHandler;
