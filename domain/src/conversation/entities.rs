//! Conversation thread entities

use crate::core::error::GatewayError;
use crate::workspace::FileRef;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const MAX_TOKEN_LEN: usize = 128;

/// Opaque, globally unique handle for a conversation thread.
///
/// Freshly generated tokens are UUIDv4 strings. Tokens received from callers
/// are only checked for shape, since stores use them as keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        let raw = raw.trim();
        if raw.is_empty() || raw.len() > MAX_TOKEN_LEN {
            return Err(GatewayError::Argument(format!(
                "continuation_id must be 1-{} characters",
                MAX_TOKEN_LEN
            )));
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(GatewayError::Argument(format!(
                "continuation_id contains invalid characters: {}",
                raw
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// A turn as stored in a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Position in the thread, starting at 0 with no gaps
    pub index: usize,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attached_files: Vec<FileRef>,
    pub timestamp: DateTime<Utc>,
    /// Model that produced this turn (assistant turns only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

/// A turn before it has been assigned an index.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTurn {
    pub role: Role,
    pub content: String,
    pub attached_files: Vec<FileRef>,
    pub model_id: Option<String>,
    pub provider_id: Option<String>,
}

impl NewTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            attached_files: Vec::new(),
            model_id: None,
            provider_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn with_files(mut self, files: Vec<FileRef>) -> Self {
        self.attached_files = files;
        self
    }

    pub fn with_model(mut self, provider_id: impl Into<String>, model_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self.model_id = Some(model_id.into());
        self
    }
}

/// Persisted multi-turn conversation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationThread {
    pub token: ContinuationToken,
    pub tool_name: String,
    pub turns: Vec<ConversationTurn>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    /// Incremented on every successful append; used for compare-and-swap.
    #[serde(default)]
    pub version: u64,
}

impl ConversationThread {
    /// Start a thread with its first turn at index 0.
    pub fn start(
        token: ContinuationToken,
        tool_name: impl Into<String>,
        first: NewTurn,
        now: DateTime<Utc>,
    ) -> Self {
        let mut thread = Self {
            token,
            tool_name: tool_name.into(),
            turns: Vec::new(),
            created_at: now,
            last_activity_at: now,
            version: 0,
        };
        thread.push(first, now);
        thread
    }

    /// Append a turn, failing with `ThreadFull` once `max_turns` are stored.
    pub fn append(
        &mut self,
        turn: NewTurn,
        max_turns: usize,
        now: DateTime<Utc>,
    ) -> Result<&ConversationTurn, GatewayError> {
        if self.turns.len() >= max_turns {
            return Err(GatewayError::ThreadFull {
                token: self.token.to_string(),
                max_turns,
            });
        }
        Ok(self.push(turn, now))
    }

    fn push(&mut self, turn: NewTurn, now: DateTime<Utc>) -> &ConversationTurn {
        let index = self.turns.len();
        self.turns.push(ConversationTurn {
            index,
            role: turn.role,
            content: turn.content,
            attached_files: turn.attached_files,
            timestamp: now,
            model_id: turn.model_id,
            provider_id: turn.provider_id,
        });
        self.last_activity_at = now;
        self.version += 1;
        &self.turns[index]
    }

    pub fn next_index(&self) -> usize {
        self.turns.len()
    }

    /// Whether the thread has been idle for at least `ttl`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.last_activity_at) >= ttl
    }

    /// `(provider_id, model_id)` of the most recent assistant turn that recorded one.
    pub fn last_assistant_model(&self) -> Option<(&str, &str)> {
        self.turns
            .iter()
            .rev()
            .filter(|t| t.role == Role::Assistant)
            .find_map(|t| match (&t.provider_id, &t.model_id) {
                (Some(provider), Some(model)) => Some((provider.as_str(), model.as_str())),
                _ => None,
            })
    }
}

/// Turns handed to a tool handler, after budget truncation.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadContext {
    pub token: ContinuationToken,
    pub tool_name: String,
    pub turns: Vec<ConversationTurn>,
    /// Number of oldest turns left out to fit the budget
    pub dropped: usize,
}

impl ThreadContext {
    pub fn is_truncated(&self) -> bool {
        self.dropped > 0
    }

    /// Files attached to turns still in the context, newest turn first.
    ///
    /// Each path appears once; paths already in `current` are left out.
    /// Turns dropped for the budget contribute nothing.
    pub fn carried_files(&self, current: &[FileRef]) -> Vec<FileRef> {
        let mut seen: HashSet<&Path> = current.iter().map(|f| f.sandbox_path.as_path()).collect();
        let mut files = Vec::new();
        for turn in self.turns.iter().rev() {
            for file in &turn.attached_files {
                if seen.insert(file.sandbox_path.as_path()) {
                    files.push(file.clone());
                }
            }
        }
        files
    }
}
