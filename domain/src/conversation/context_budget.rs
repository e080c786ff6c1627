//! Context budget for conversation history.
//!
//! [`ContextBudget`] bounds how much prior conversation is replayed to a
//! model. When a thread outgrows the budget the oldest turns are dropped
//! first; the most recent turn is always kept, even if it alone exceeds the
//! budget.

use super::entities::ConversationTurn;
use serde::{Deserialize, Serialize};

/// Rough bytes-per-token ratio used to size budgets from a context window.
pub const BYTES_PER_TOKEN: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBudget {
    max_bytes: usize,
}

impl ContextBudget {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// Budget sized as a share of a model's context window, capped at `cap_bytes`.
    ///
    /// `history_ratio` is clamped to `0.0..=1.0`.
    pub fn for_context_window(context_window_tokens: u64, history_ratio: f64, cap_bytes: usize) -> Self {
        let ratio = history_ratio.clamp(0.0, 1.0);
        let window_bytes = context_window_tokens.saturating_mul(BYTES_PER_TOKEN) as f64;
        let share = (window_bytes * ratio) as u64;
        let max_bytes = usize::try_from(share).unwrap_or(usize::MAX).min(cap_bytes);
        Self { max_bytes }
    }

    /// Unlimited preset: no truncation.
    pub fn unlimited() -> Self {
        Self { max_bytes: usize::MAX }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Longest suffix of `turns` that fits, never shorter than one turn.
    pub fn select<'a>(&self, turns: &'a [ConversationTurn]) -> &'a [ConversationTurn] {
        let mut used = 0usize;
        let mut start = turns.len();
        for (i, turn) in turns.iter().enumerate().rev() {
            let size = turn_size(turn);
            if start < turns.len() && used.saturating_add(size) > self.max_bytes {
                break;
            }
            used = used.saturating_add(size);
            start = i;
        }
        &turns[start..]
    }
}

fn turn_size(turn: &ConversationTurn) -> usize {
    turn.content.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::entities::Role;
    use chrono::Utc;

    fn turns(sizes: &[usize]) -> Vec<ConversationTurn> {
        sizes
            .iter()
            .enumerate()
            .map(|(index, &size)| ConversationTurn {
                index,
                role: if index % 2 == 0 { Role::User } else { Role::Assistant },
                content: "x".repeat(size),
                attached_files: Vec::new(),
                timestamp: Utc::now(),
                model_id: None,
                provider_id: None,
            })
            .collect()
    }

    #[test]
    fn test_everything_fits() {
        let all = turns(&[10, 10, 10]);
        assert_eq!(ContextBudget::new(100).select(&all).len(), 3);
    }

    #[test]
    fn test_drops_oldest_first() {
        let all = turns(&[40, 40, 40]);
        let kept = ContextBudget::new(90).select(&all);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].index, 1);
        assert_eq!(kept[1].index, 2);
    }

    #[test]
    fn test_always_keeps_newest_turn() {
        let all = turns(&[10, 500]);
        let kept = ContextBudget::new(100).select(&all);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].index, 1);
    }

    #[test]
    fn test_empty_history() {
        assert!(ContextBudget::new(10).select(&[]).is_empty());
    }

    #[test]
    fn test_stops_at_first_gap() {
        // A small old turn is not kept once a larger newer one was dropped.
        let all = turns(&[5, 80, 30]);
        let kept = ContextBudget::new(60).select(&all);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].index, 2);
    }

    #[test]
    fn test_for_context_window() {
        let budget = ContextBudget::for_context_window(1_000, 0.5, usize::MAX);
        assert_eq!(budget.max_bytes(), 2_000);

        let capped = ContextBudget::for_context_window(1_000_000, 0.5, 50_000);
        assert_eq!(capped.max_bytes(), 50_000);

        let clamped = ContextBudget::for_context_window(100, 3.0, usize::MAX);
        assert_eq!(clamped.max_bytes(), 400);
    }

    #[test]
    fn test_unlimited() {
        let all = turns(&[10_000, 10_000, 10_000]);
        assert_eq!(ContextBudget::unlimited().select(&all).len(), 3);
    }
}
