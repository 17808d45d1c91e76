//! Stability AI image generation client.
//!
//! Wraps the JSON text-to-image endpoint
//! (`POST {base}/v1/generation/{engine}/text-to-image`) and decodes the
//! base64 artifact into raw bytes.

use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{GeneratedImage, ProviderConfig};

const PROVIDER: &str = "stability";
const DEFAULT_BASE_URL: &str = "https://api.stability.ai";
const DEFAULT_ENGINE: &str = "stable-diffusion-xl-1024-v1-0";

/// Configuration for the Stability client.
#[derive(Debug, Clone)]
pub struct StabilityConfig {
    /// API key; falls back to `STABILITY_API_KEY`.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Engine identifier in the URL path.
    pub engine: String,
    pub timeout_secs: u64,
    pub width: u32,
    pub height: u32,
    /// Classifier-free guidance scale.
    pub cfg_scale: f32,
    pub steps: u32,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            engine: DEFAULT_ENGINE.to_string(),
            timeout_secs: 120,
            width: 1024,
            height: 1024,
            cfg_scale: 7.0,
            steps: 30,
        }
    }
}

impl StabilityConfig {
    pub fn from_provider_config(config: &ProviderConfig) -> Self {
        let defaults = Self::default();
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone().unwrap_or(defaults.base_url),
            engine: config.model.clone().unwrap_or(defaults.engine),
            timeout_secs: config.timeout_secs,
            width: defaults.width,
            height: defaults.height,
            cfg_scale: defaults.cfg_scale,
            steps: defaults.steps,
        }
    }

    fn get_api_key(&self) -> DomainResult<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("STABILITY_API_KEY").ok())
            .ok_or(DomainError::MissingApiKey {
                provider: PROVIDER,
                env_var: "STABILITY_API_KEY",
            })
    }
}

/// Stability image generation client.
#[derive(Clone)]
pub struct StabilityClient {
    config: StabilityConfig,
    client: Client,
}

impl StabilityClient {
    pub fn new(config: StabilityConfig) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::ValidationFailed(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Generate one image for the prompt and decode the first artifact.
    pub async fn generate_image(&self, prompt: &str) -> DomainResult<GeneratedImage> {
        let api_key = self.config.get_api_key()?;
        let url = format!(
            "{}/v1/generation/{}/text-to-image",
            self.config.base_url, self.config.engine
        );

        let body = GenerationRequest {
            text_prompts: vec![TextPrompt {
                text: prompt.to_string(),
                weight: 1.0,
            }],
            width: self.config.width,
            height: self.config.height,
            cfg_scale: self.config.cfg_scale,
            steps: self.config.steps,
            samples: 1,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::unreachable(PROVIDER, &e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::status(PROVIDER, status, body));
        }

        let parsed: GenerationResponse = response
            .json()
            .await
            .map_err(|e| DomainError::malformed(PROVIDER, e.to_string()))?;

        let artifact = parsed
            .artifacts
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::malformed(PROVIDER, "response had no artifacts"))?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(artifact.base64.as_bytes())
            .map_err(|e| DomainError::malformed(PROVIDER, format!("invalid base64 artifact: {e}")))?;

        Ok(GeneratedImage {
            prompt: prompt.to_string(),
            bytes,
            format: "png".to_string(),
            seed: artifact.seed,
            finish_reason: artifact.finish_reason,
        })
    }
}

// -- wire types --

#[derive(Debug, Serialize)]
struct GenerationRequest {
    text_prompts: Vec<TextPrompt>,
    width: u32,
    height: u32,
    cfg_scale: f32,
    steps: u32,
    samples: u32,
}

#[derive(Debug, Serialize)]
struct TextPrompt {
    text: String,
    weight: f32,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    artifacts: Vec<Artifact>,
}

#[derive(Debug, Deserialize)]
struct Artifact {
    base64: String,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(rename = "finishReason", default)]
    finish_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_config_error() {
        temp_env::with_var_unset("STABILITY_API_KEY", || {
            let err = StabilityConfig::default().get_api_key().unwrap_err();
            assert!(matches!(
                err,
                DomainError::MissingApiKey { provider: "stability", .. }
            ));
        });
    }

    #[tokio::test]
    async fn test_generate_decodes_base64_artifact() {
        let mut server = mockito::Server::new_async().await;
        let png_header = b"\x89PNG\r\n";
        let encoded = base64::engine::general_purpose::STANDARD.encode(png_header);
        server
            .mock(
                "POST",
                "/v1/generation/stable-diffusion-xl-1024-v1-0/text-to-image",
            )
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "artifacts": [{"base64": encoded, "seed": 42, "finishReason": "SUCCESS"}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = StabilityClient::new(StabilityConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.url(),
            ..Default::default()
        })
        .unwrap();

        let image = client.generate_image("a crab writing code").await.unwrap();
        assert_eq!(image.bytes, png_header);
        assert_eq!(image.seed, Some(42));
        assert_eq!(image.finish_reason.as_deref(), Some("SUCCESS"));
    }

    #[tokio::test]
    async fn test_empty_artifacts_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "POST",
                "/v1/generation/stable-diffusion-xl-1024-v1-0/text-to-image",
            )
            .with_status(200)
            .with_body(r#"{"artifacts": []}"#)
            .create_async()
            .await;

        let client = StabilityClient::new(StabilityConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.url(),
            ..Default::default()
        })
        .unwrap();

        let err = client.generate_image("prompt").await.unwrap_err();
        assert!(matches!(err, DomainError::MalformedResponse { .. }));
    }
}
