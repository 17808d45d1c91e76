//! OpenAI chat completions client.
//!
//! Thin wrapper over `POST {base}/chat/completions`: builds the request
//! from the prompt plus configured defaults, reshapes `choices[0]` and
//! the usage block, and propagates errors unchanged.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::ProviderConfig;
use crate::domain::ports::{ChatOutcome, ChatProvider};

const PROVIDER: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for the OpenAI client.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key; falls back to `OPENAI_API_KEY`.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Sampling temperature sent with every request.
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 60,
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

impl OpenAiConfig {
    /// Build from the shared provider config section.
    pub fn from_provider_config(config: &ProviderConfig) -> Self {
        let defaults = Self::default();
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone().unwrap_or(defaults.base_url),
            model: config.model.clone().unwrap_or(defaults.model),
            timeout_secs: config.timeout_secs,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
        }
    }

    fn get_api_key(&self) -> DomainResult<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or(DomainError::MissingApiKey {
                provider: PROVIDER,
                env_var: "OPENAI_API_KEY",
            })
    }
}

/// OpenAI chat completions client.
#[derive(Clone)]
pub struct OpenAiClient {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::ValidationFailed(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    async fn completions(&self, messages: Vec<WireMessage>) -> DomainResult<(ChatCompletionResponse, u64)> {
        let api_key = self.config.get_api_key()?;
        let url = format!("{}/chat/completions", self.config.base_url);

        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
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

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| DomainError::malformed(PROVIDER, e.to_string()))?;

        Ok((parsed, started.elapsed().as_millis() as u64))
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
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
        let messages = vec![WireMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }];
        let (response, latency_ms) = self.completions(messages).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::malformed(PROVIDER, "response had no choices"))?;

        let usage = response.usage.unwrap_or_default();
        Ok(ChatOutcome {
            content: choice.message.content,
            model: response.model,
            latency_ms,
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        })
    }
}

// -- wire types --

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<Choice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
}

#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OpenAiConfig::default();
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4o-mini");
    }

    #[test]
    fn test_missing_key_is_config_error() {
        temp_env::with_var_unset("OPENAI_API_KEY", || {
            let config = OpenAiConfig::default();
            let err = config.get_api_key().unwrap_err();
            assert!(matches!(
                err,
                DomainError::MissingApiKey { provider: "openai", .. }
            ));
        });
    }

    #[tokio::test]
    async fn test_chat_reshapes_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "model": "gpt-4o-mini",
                    "choices": [
                        {"message": {"role": "assistant", "content": "Rust is a systems language."}},
                        {"message": {"role": "assistant", "content": "ignored"}}
                    ],
                    "usage": {"prompt_tokens": 12, "completion_tokens": 7}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let config = OpenAiConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.url(),
            ..Default::default()
        };
        let client = OpenAiClient::new(config).unwrap();

        let outcome = client.chat("What is Rust?").await.unwrap();
        assert_eq!(outcome.content, "Rust is a systems language.");
        assert_eq!(outcome.input_tokens, 12);
        assert_eq!(outcome.output_tokens, 7);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_propagates_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error": {"message": "rate limited"}}"#)
            .create_async()
            .await;

        let config = OpenAiConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.url(),
            ..Default::default()
        };
        let client = OpenAiClient::new(config).unwrap();

        let err = client.chat("hi").await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::ProviderStatus { provider: "openai", status: 429, .. }
        ));
    }
}
