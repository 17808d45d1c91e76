//! Chat provider port used by the consensus pipeline.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// What a single chat call produced, before any persistence.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub content: String,
    pub model: String,
    pub latency_ms: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// A generative text provider the consensus pipeline can fan out to.
///
/// Implementations are thin HTTP wrappers: they must not retry, and a
/// missing credential must surface as a configuration error before any
/// network call is made.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Stable provider name used in `ai_responses.provider` and usage logs.
    fn name(&self) -> &'static str;

    /// Model identifier this provider will answer with.
    fn model(&self) -> String;

    /// Whether the provider is usable right now (credential present).
    async fn is_available(&self) -> bool;

    /// Send a single prompt and return the reshaped completion.
    async fn chat(&self, prompt: &str) -> DomainResult<ChatOutcome>;
}
