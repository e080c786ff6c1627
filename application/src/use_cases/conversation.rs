//! Conversation Manager use case.
//!
//! Owns the lifecycle of multi-turn threads on top of a [`ThreadStore`].
//!
//! Appends to one token are serialized twice over: an in-process async lock
//! per token orders local writers, and the store's compare-and-swap on the
//! thread version keeps writers in other processes from losing updates.
//! Distinct tokens never contend.

use crate::config::ConversationConfig;
use crate::ports::thread_store::{StoreError, ThreadStore};
use chrono::{DateTime, Utc};
use gateway_domain::{
    ContextBudget, ContinuationToken, ConversationThread, ConversationTurn, GatewayError,
    ModelDescriptor, NewTurn, ThreadContext,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// CAS retries before an append gives up.
const MAX_CAS_RETRIES: usize = 16;
/// Attempts at drawing a fresh token before giving up.
const MAX_TOKEN_ATTEMPTS: usize = 3;

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct ConversationManager {
    store: Arc<dyn ThreadStore>,
    config: ConversationConfig,
    locks: Mutex<HashMap<ContinuationToken, Arc<Mutex<()>>>>,
    clock: Clock,
}

impl ConversationManager {
    pub fn new(store: Arc<dyn ThreadStore>, config: ConversationConfig) -> Self {
        Self {
            store,
            config,
            locks: Mutex::new(HashMap::new()),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock (tests).
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &ConversationConfig {
        &self.config
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn ttl(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.config.ttl).unwrap_or(chrono::Duration::MAX)
    }

    /// Start a thread with `first` as turn 0.
    pub async fn create_thread(
        &self,
        tool_name: &str,
        first: NewTurn,
    ) -> Result<ConversationThread, GatewayError> {
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let thread = ConversationThread::start(
                ContinuationToken::generate(),
                tool_name,
                first.clone(),
                self.now(),
            );
            match self.store.insert(&thread).await {
                Ok(()) => {
                    debug!(token = %thread.token, tool = tool_name, "Created conversation thread");
                    return Ok(thread);
                }
                Err(StoreError::AlreadyExists(token)) => {
                    warn!(token = %token, "Generated continuation token already in use, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(GatewayError::Storage(
            "could not allocate an unused continuation token".to_string(),
        ))
    }

    /// Append a turn and return it with its assigned index.
    pub async fn append_turn(
        &self,
        token: &ContinuationToken,
        turn: NewTurn,
    ) -> Result<ConversationTurn, GatewayError> {
        let lock = self.lock_for(token).await;
        let result = {
            let _guard = lock.lock().await;
            self.append_locked(token, turn).await
        };
        drop(lock);
        self.release_lock(token).await;
        result
    }

    async fn append_locked(
        &self,
        token: &ContinuationToken,
        turn: NewTurn,
    ) -> Result<ConversationTurn, GatewayError> {
        for attempt in 0..MAX_CAS_RETRIES {
            let mut thread = self.load_live(token).await?;
            let expected = thread.version;
            let appended = thread
                .append(turn.clone(), self.config.max_turns, self.now())?
                .clone();

            match self.store.compare_and_swap(&thread, expected).await {
                Ok(()) => {
                    debug!(token = %token, index = appended.index, role = appended.role.as_str(), "Appended turn");
                    return Ok(appended);
                }
                Err(StoreError::Conflict { found, .. }) => {
                    debug!(token = %token, attempt, expected, found, "Concurrent update, retrying append");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(GatewayError::Storage(format!(
            "thread {} is updated too frequently to append",
            token
        )))
    }

    /// Ordered turns of a thread, oldest dropped first to fit `budget`.
    pub async fn load_context(
        &self,
        token: &ContinuationToken,
        budget: ContextBudget,
    ) -> Result<ThreadContext, GatewayError> {
        let thread = self.load_live(token).await?;
        let kept = budget.select(&thread.turns);
        let dropped = thread.turns.len() - kept.len();
        if dropped > 0 {
            debug!(token = %token, dropped, kept = kept.len(), "Truncated conversation history");
        }
        Ok(ThreadContext {
            token: thread.token.clone(),
            tool_name: thread.tool_name.clone(),
            turns: kept.to_vec(),
            dropped,
        })
    }

    /// Live thread; unknown and expired threads are both `ThreadNotFound`.
    pub async fn get_thread(&self, token: &ContinuationToken) -> Result<ConversationThread, GatewayError> {
        self.load_live(token).await
    }

    async fn load_live(&self, token: &ContinuationToken) -> Result<ConversationThread, GatewayError> {
        match self.store.load(token).await? {
            Some(thread) if !thread.is_expired(self.now(), self.ttl()) => Ok(thread),
            _ => Err(GatewayError::ThreadNotFound(token.to_string())),
        }
    }

    /// History budget for a model: a share of its context window, capped.
    pub fn budget_for(&self, model: &ModelDescriptor) -> ContextBudget {
        ContextBudget::for_context_window(
            model.context_window,
            self.config.history_ratio,
            self.config.max_context_bytes,
        )
    }

    /// Explicitly close a thread. Returns whether a live thread was removed.
    pub async fn close_thread(&self, token: &ContinuationToken) -> Result<bool, GatewayError> {
        let removed = self.store.remove(token).await?;
        if removed {
            info!(token = %token, "Closed conversation thread");
        }
        Ok(removed)
    }

    /// Remove every thread idle past the TTL. Returns how many were removed.
    pub async fn sweep_expired(&self) -> Result<usize, GatewayError> {
        let now = self.now();
        let ttl = self.ttl();
        let mut removed = 0;
        for token in self.store.tokens().await? {
            let expired = match self.store.load(&token).await {
                Ok(Some(thread)) => thread.is_expired(now, ttl),
                Ok(None) => false,
                Err(e) => {
                    warn!(token = %token, error = %e, "Skipping unreadable thread during sweep");
                    false
                }
            };
            if expired && self.store.remove(&token).await? {
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, "Swept expired conversation threads");
        }
        Ok(removed)
    }

    /// Run [`sweep_expired`](Self::sweep_expired) every `sweep_interval`
    /// until `cancel` fires.
    pub fn spawn_sweeper(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let interval = self.config.sweep_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = self.sweep_expired().await {
                            warn!(error = %e, "Conversation sweep failed");
                        }
                    }
                }
            }
            debug!("Conversation sweeper stopped");
        })
    }

    async fn lock_for(&self, token: &ContinuationToken) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(token.clone()).or_default())
    }

    async fn release_lock(&self, token: &ContinuationToken) {
        let mut locks = self.locks.lock().await;
        if locks.get(token).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(token);
        }
    }
}
