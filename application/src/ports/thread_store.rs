//! Thread store port
//!
//! Key-value persistence for conversation threads, keyed by continuation
//! token. Writers use optimistic concurrency: every update names the version
//! it was derived from, and the store rejects it if the stored version moved.

use async_trait::async_trait;
use gateway_domain::{ContinuationToken, ConversationThread, GatewayError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The token is live or was used by a removed thread
    #[error("Thread already exists: {0}")]
    AlreadyExists(String),

    #[error("Thread not found: {0}")]
    NotFound(String),

    #[error("Version conflict on thread {token}: expected {expected}, found {found}")]
    Conflict {
        token: String,
        expected: u64,
        found: u64,
    },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(token) => GatewayError::ThreadNotFound(token),
            other => GatewayError::Storage(other.to_string()),
        }
    }
}

#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn load(&self, token: &ContinuationToken) -> Result<Option<ConversationThread>, StoreError>;

    /// Store a new thread. Fails with `AlreadyExists` if the token was ever used.
    async fn insert(&self, thread: &ConversationThread) -> Result<(), StoreError>;

    /// Replace the stored thread if its version still equals `expected_version`.
    async fn compare_and_swap(
        &self,
        thread: &ConversationThread,
        expected_version: u64,
    ) -> Result<(), StoreError>;

    /// Remove a thread. The token stays reserved. Returns whether a live
    /// thread was removed.
    async fn remove(&self, token: &ContinuationToken) -> Result<bool, StoreError>;

    /// Tokens of every live thread.
    async fn tokens(&self) -> Result<Vec<ContinuationToken>, StoreError>;
}
