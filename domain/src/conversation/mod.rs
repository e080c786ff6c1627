//! Multi-turn conversation state.
//!
//! - [`entities::ConversationThread`]: persisted thread keyed by a [`ContinuationToken`]
//! - [`context_budget::ContextBudget`]: oldest-first truncation of replayed history

pub mod context_budget;
pub mod entities;

pub use context_budget::ContextBudget;
pub use entities::{
    ContinuationToken, ConversationThread, ConversationTurn, NewTurn, Role, ThreadContext,
};
