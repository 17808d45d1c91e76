//! Per-provider AI responses and the stored consensus winner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One provider's answer (or captured error) for a task.
///
/// A failed provider call still produces a row: `content` is `None` and
/// `error` holds the captured message, so a batch never loses the record
/// of which provider failed and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiResponse {
    pub id: Uuid,
    pub task_id: Uuid,
    pub provider: String,
    pub model: String,
    pub content: Option<String>,
    pub latency_ms: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AiResponse {
    /// Record a successful provider answer.
    pub fn success(
        task_id: Uuid,
        provider: impl Into<String>,
        model: impl Into<String>,
        content: impl Into<String>,
        latency_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            provider: provider.into(),
            model: model.into(),
            content: Some(content.into()),
            latency_ms,
            input_tokens: 0,
            output_tokens: 0,
            error: None,
            created_at: Utc::now(),
        }
    }

    /// Record a captured provider failure.
    pub fn failure(
        task_id: Uuid,
        provider: impl Into<String>,
        model: impl Into<String>,
        error: impl Into<String>,
        latency_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            provider: provider.into(),
            model: model.into(),
            content: None,
            latency_ms,
            input_tokens: 0,
            output_tokens: 0,
            error: Some(error.into()),
            created_at: Utc::now(),
        }
    }

    pub fn with_tokens(mut self, input_tokens: u64, output_tokens: u64) -> Self {
        self.input_tokens = input_tokens;
        self.output_tokens = output_tokens;
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.content.is_some()
    }
}

/// The chosen winner among a task's responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub id: Uuid,
    pub task_id: Uuid,
    pub winning_response_id: Uuid,
    /// Score of the winner under the fixed weighted sum.
    pub score: f64,
    /// Scoring method label, e.g. "weighted_sum_v1".
    pub method: String,
    pub created_at: DateTime<Utc>,
}

impl ConsensusResult {
    pub fn new(task_id: Uuid, winning_response_id: Uuid, score: f64, method: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            winning_response_id,
            score,
            method: method.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let resp = AiResponse::success(Uuid::new_v4(), "openai", "gpt-4o", "hello", 120);
        assert!(resp.is_success());
        assert!(resp.error.is_none());
    }

    #[test]
    fn test_failure_response_keeps_error() {
        let resp = AiResponse::failure(Uuid::new_v4(), "openai", "gpt-4o", "timed out", 5000);
        assert!(!resp.is_success());
        assert_eq!(resp.error.as_deref(), Some("timed out"));
        assert!(resp.content.is_none());
    }
}
