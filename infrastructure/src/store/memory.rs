//! Process-local thread store.

use async_trait::async_trait;
use gateway_application::{StoreError, ThreadStore};
use gateway_domain::{ContinuationToken, ConversationThread};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    threads: HashMap<ContinuationToken, ConversationThread>,
    /// Tokens of removed threads; never handed out again
    retired: HashSet<ContinuationToken>,
}

/// [`ThreadStore`] kept in memory. Threads are lost when the process exits.
#[derive(Default)]
pub struct InMemoryThreadStore {
    inner: Mutex<Inner>,
}

impl InMemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("thread store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ThreadStore for InMemoryThreadStore {
    async fn load(&self, token: &ContinuationToken) -> Result<Option<ConversationThread>, StoreError> {
        Ok(self.lock()?.threads.get(token).cloned())
    }

    async fn insert(&self, thread: &ConversationThread) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.threads.contains_key(&thread.token) || inner.retired.contains(&thread.token) {
            return Err(StoreError::AlreadyExists(thread.token.to_string()));
        }
        inner.threads.insert(thread.token.clone(), thread.clone());
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        thread: &ConversationThread,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let current = inner
            .threads
            .get_mut(&thread.token)
            .ok_or_else(|| StoreError::NotFound(thread.token.to_string()))?;
        if current.version != expected_version {
            return Err(StoreError::Conflict {
                token: thread.token.to_string(),
                expected: expected_version,
                found: current.version,
            });
        }
        *current = thread.clone();
        Ok(())
    }

    async fn remove(&self, token: &ContinuationToken) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;
        if inner.threads.remove(token).is_none() {
            return Ok(false);
        }
        inner.retired.insert(token.clone());
        Ok(true)
    }

    async fn tokens(&self) -> Result<Vec<ContinuationToken>, StoreError> {
        Ok(self.lock()?.threads.keys().cloned().collect())
    }
}
