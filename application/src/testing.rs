//! Test doubles shared by the use case tests.

use crate::ports::provider_client::ProviderClient;
use crate::ports::thread_store::{StoreError, ThreadStore};
use async_trait::async_trait;
use gateway_domain::{
    ContinuationToken, ConversationThread, GatewayError, GenerationOutput, GenerationRequest,
    ModelDescriptor, ProviderId, UsageStats,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Provider client returning scripted results, then a default reply.
pub struct MockClient {
    id: ProviderId,
    timeout: Duration,
    delay: Duration,
    script: Mutex<VecDeque<Result<GenerationOutput, GatewayError>>>,
    pub requests: Mutex<Vec<(String, GenerationRequest)>>,
}

impl MockClient {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ProviderId::new(id),
            timeout: Duration::from_secs(5),
            delay: Duration::ZERO,
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn then(self, result: Result<GenerationOutput, GatewayError>) -> Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().unwrap().last().map(|(_, r)| r.clone())
    }
}

#[async_trait]
impl ProviderClient for MockClient {
    fn provider_id(&self) -> &ProviderId {
        &self.id
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn generate(
        &self,
        model: &ModelDescriptor,
        request: &GenerationRequest,
    ) -> Result<GenerationOutput, GatewayError> {
        self.requests
            .lock()
            .unwrap()
            .push((model.model_id.clone(), request.clone()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(GenerationOutput::new(format!("reply from {}", model.model_id))
                .with_usage(UsageStats::new(10, 5)))
        })
    }
}

/// Minimal in-memory store with tombstones.
#[derive(Default)]
pub struct MemoryStore {
    threads: Mutex<HashMap<ContinuationToken, ConversationThread>>,
    retired: Mutex<HashSet<ContinuationToken>>,
}

#[async_trait]
impl ThreadStore for MemoryStore {
    async fn load(&self, token: &ContinuationToken) -> Result<Option<ConversationThread>, StoreError> {
        Ok(self.threads.lock().unwrap().get(token).cloned())
    }

    async fn insert(&self, thread: &ConversationThread) -> Result<(), StoreError> {
        let mut threads = self.threads.lock().unwrap();
        if threads.contains_key(&thread.token) || self.retired.lock().unwrap().contains(&thread.token) {
            return Err(StoreError::AlreadyExists(thread.token.to_string()));
        }
        threads.insert(thread.token.clone(), thread.clone());
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        thread: &ConversationThread,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let mut threads = self.threads.lock().unwrap();
        let current = threads
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
        self.retired.lock().unwrap().insert(token.clone());
        Ok(self.threads.lock().unwrap().remove(token).is_some())
    }

    async fn tokens(&self) -> Result<Vec<ContinuationToken>, StoreError> {
        Ok(self.threads.lock().unwrap().keys().cloned().collect())
    }
}
