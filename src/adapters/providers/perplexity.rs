//! Perplexity web-search client.
//!
//! Perplexity speaks the OpenAI chat-completions wire shape and adds a
//! `citations` array, which is what makes answers "grounded". Besides
//! single searches, this client carries the two fan-out helpers:
//! [`PerplexityClient::search_batch`] and [`PerplexityClient::verify_batch`],
//! both of which capture per-item errors instead of failing the batch.

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Citation, GroundedAnswer, ProviderConfig, VerifiedClaim};
use crate::domain::ports::{ChatOutcome, ChatProvider};

const PROVIDER: &str = "perplexity";
const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";
const DEFAULT_MODEL: &str = "sonar";

/// Configuration for the Perplexity client.
#[derive(Debug, Clone)]
pub struct PerplexityConfig {
    /// API key; falls back to `PERPLEXITY_API_KEY`.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for PerplexityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl PerplexityConfig {
    pub fn from_provider_config(config: &ProviderConfig) -> Self {
        let defaults = Self::default();
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone().unwrap_or(defaults.base_url),
            model: config.model.clone().unwrap_or(defaults.model),
            timeout_secs: config.timeout_secs,
        }
    }

    fn get_api_key(&self) -> DomainResult<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("PERPLEXITY_API_KEY").ok())
            .ok_or(DomainError::MissingApiKey {
                provider: PROVIDER,
                env_var: "PERPLEXITY_API_KEY",
            })
    }
}

/// Perplexity chat/search client.
#[derive(Clone)]
pub struct PerplexityClient {
    config: PerplexityConfig,
    client: Client,
}

impl PerplexityClient {
    pub fn new(config: PerplexityConfig) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::ValidationFailed(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    async fn completions(&self, content: String) -> DomainResult<(SearchResponse, u64)> {
        let api_key = self.config.get_api_key()?;
        let url = format!("{}/chat/completions", self.config.base_url);

        let body = SearchRequest {
            model: self.config.model.clone(),
            messages: vec![WireMessage {
                role: "user".to_string(),
                content,
            }],
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::unreachable(PROVIDER, &e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::status(PROVIDER, status, body));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| DomainError::malformed(PROVIDER, e.to_string()))?;

        Ok((parsed, started.elapsed().as_millis() as u64))
    }

    fn reshape(query: &str, response: SearchResponse, latency_ms: u64) -> DomainResult<GroundedAnswer> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::malformed(PROVIDER, "response had no choices"))?;

        Ok(GroundedAnswer {
            query: query.to_string(),
            answer: choice.message.content,
            citations: response
                .citations
                .into_iter()
                .map(|url| Citation { url })
                .collect(),
            model: response.model,
            latency_ms,
        })
    }

    /// Run one grounded search.
    pub async fn search(&self, query: &str) -> DomainResult<GroundedAnswer> {
        let (response, latency_ms) = self.completions(query.to_string()).await?;
        Self::reshape(query, response, latency_ms)
    }

    /// Run many searches concurrently; each item is `Ok(answer)` or the
    /// error for that query. One failing query never fails the batch.
    pub async fn search_batch(
        &self,
        queries: &[String],
    ) -> Vec<Result<GroundedAnswer, DomainError>> {
        join_all(queries.iter().map(|q| self.search(q))).await
    }

    /// Ask the model to verify each claim, concurrently, capturing
    /// per-item errors into the [`VerifiedClaim`] records.
    pub async fn verify_batch(&self, claims: &[String]) -> Vec<VerifiedClaim> {
        let verdicts = join_all(claims.iter().map(|claim| async move {
            let prompt = format!(
                "Is the following claim accurate? Answer with a short verdict \
                 and cite sources.\n\nClaim: {claim}"
            );
            self.search(&prompt).await
        }))
        .await;

        claims
            .iter()
            .zip(verdicts)
            .map(|(claim, verdict)| match verdict {
                Ok(answer) => VerifiedClaim {
                    claim: claim.clone(),
                    verdict: Some(answer.answer),
                    citations: answer.citations,
                    error: None,
                },
                Err(e) => VerifiedClaim {
                    claim: claim.clone(),
                    verdict: None,
                    citations: Vec::new(),
                    error: Some(e.to_string()),
                },
            })
            .collect()
    }
}

#[async_trait]
impl ChatProvider for PerplexityClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }

    async fn is_available(&self) -> bool {
        self.config.get_api_key().is_ok()
    }

    async fn chat(&self, prompt: &str) -> DomainResult<ChatOutcome> {
        let (response, latency_ms) = self.completions(prompt.to_string()).await?;
        let usage = response.usage.clone().unwrap_or_default();
        let model = response.model.clone();
        let answer = Self::reshape(prompt, response, latency_ms)?;
        Ok(ChatOutcome {
            content: answer.answer,
            model,
            latency_ms,
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        })
    }
}

// -- wire types --

#[derive(Debug, Serialize)]
struct SearchRequest {
    model: String,
    messages: Vec<WireMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    citations: Vec<String>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_body(answer: &str) -> String {
        serde_json::json!({
            "model": "sonar",
            "choices": [{"message": {"role": "assistant", "content": answer}}],
            "citations": ["https://doc.rust-lang.org/", "https://blog.rust-lang.org/"],
            "usage": {"prompt_tokens": 20, "completion_tokens": 40}
        })
        .to_string()
    }

    fn client_for(server: &mockito::Server) -> PerplexityClient {
        PerplexityClient::new(PerplexityConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.url(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_missing_key_is_config_error() {
        temp_env::with_var_unset("PERPLEXITY_API_KEY", || {
            let err = PerplexityConfig::default().get_api_key().unwrap_err();
            assert!(matches!(
                err,
                DomainError::MissingApiKey { provider: "perplexity", .. }
            ));
        });
    }

    #[tokio::test]
    async fn test_search_carries_citations() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(mock_body("Rust 1.80 stabilized LazyLock."))
            .create_async()
            .await;

        let client = client_for(&server);
        let answer = client.search("rust 1.80 news").await.unwrap();
        assert_eq!(answer.citations.len(), 2);
        assert_eq!(answer.citations[0].url, "https://doc.rust-lang.org/");
        assert_eq!(answer.query, "rust 1.80 news");
    }

    #[tokio::test]
    async fn test_search_batch_captures_per_item_errors() {
        let mut server = mockito::Server::new_async().await;
        // The "first" query succeeds, the "second" one gets a 500.
        server
            .mock("POST", "/chat/completions")
            .match_body(mockito::Matcher::Regex("first".to_string()))
            .with_status(200)
            .with_body(mock_body("ok"))
            .create_async()
            .await;
        server
            .mock("POST", "/chat/completions")
            .match_body(mockito::Matcher::Regex("second".to_string()))
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let client = client_for(&server);
        let queries = vec!["first".to_string(), "second".to_string()];
        let results = client.search_batch(&queries).await;

        assert_eq!(results.len(), 2);
        let (ok, failed): (Vec<_>, Vec<_>) = results.iter().partition(|r| r.is_ok());
        assert_eq!(ok.len(), 1);
        assert_eq!(failed.len(), 1);
    }

    #[tokio::test]
    async fn test_verify_batch_reshapes_verdicts() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(mock_body("Accurate."))
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server);
        let claims = vec!["claim a".to_string(), "claim b".to_string()];
        let verified = client.verify_batch(&claims).await;

        assert_eq!(verified.len(), 2);
        assert!(verified.iter().all(|v| v.error.is_none()));
        assert_eq!(verified[0].claim, "claim a");
        assert_eq!(verified[0].verdict.as_deref(), Some("Accurate."));
    }
}
