//! ElevenLabs text-to-speech client.
//!
//! `POST {base}/v1/text-to-speech/{voice_id}` returns raw audio bytes;
//! `GET {base}/v1/voices` lists the available voices. The API key goes
//! in the `xi-api-key` header rather than a bearer token.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ProviderConfig, SpeechAudio, Voice};

const PROVIDER: &str = "elevenlabs";
const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
const DEFAULT_MODEL: &str = "eleven_multilingual_v2";

/// Configuration for the ElevenLabs client.
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    /// API key; falls back to `ELEVENLABS_API_KEY`.
    pub api_key: Option<String>,
    pub base_url: String,
    /// TTS model identifier sent with each request.
    pub model: String,
    pub timeout_secs: u64,
    pub stability: f32,
    pub similarity_boost: f32,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 60,
            stability: 0.5,
            similarity_boost: 0.75,
        }
    }
}

impl ElevenLabsConfig {
    pub fn from_provider_config(config: &ProviderConfig) -> Self {
        let defaults = Self::default();
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone().unwrap_or(defaults.base_url),
            model: config.model.clone().unwrap_or(defaults.model),
            timeout_secs: config.timeout_secs,
            stability: defaults.stability,
            similarity_boost: defaults.similarity_boost,
        }
    }

    fn get_api_key(&self) -> DomainResult<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("ELEVENLABS_API_KEY").ok())
            .ok_or(DomainError::MissingApiKey {
                provider: PROVIDER,
                env_var: "ELEVENLABS_API_KEY",
            })
    }
}

/// ElevenLabs text-to-speech client.
#[derive(Clone)]
pub struct ElevenLabsClient {
    config: ElevenLabsConfig,
    client: Client,
}

impl ElevenLabsClient {
    pub fn new(config: ElevenLabsConfig) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::ValidationFailed(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Synthesize speech for `text` with the given voice.
    pub async fn synthesize(&self, text: &str, voice_id: &str) -> DomainResult<SpeechAudio> {
        let api_key = self.config.get_api_key()?;
        let url = format!("{}/v1/text-to-speech/{voice_id}", self.config.base_url);

        let body = SynthesisRequest {
            text: text.to_string(),
            model_id: self.config.model.clone(),
            voice_settings: VoiceSettings {
                stability: self.config.stability,
                similarity_boost: self.config.similarity_boost,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::unreachable(PROVIDER, &e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::status(PROVIDER, status, body));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/mpeg")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DomainError::malformed(PROVIDER, e.to_string()))?;

        Ok(SpeechAudio {
            voice_id: voice_id.to_string(),
            bytes: bytes.to_vec(),
            content_type,
        })
    }

    /// List the voices available to the account.
    pub async fn list_voices(&self) -> DomainResult<Vec<Voice>> {
        let api_key = self.config.get_api_key()?;
        let url = format!("{}/v1/voices", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .header("xi-api-key", &api_key)
            .send()
            .await
            .map_err(|e| DomainError::unreachable(PROVIDER, &e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::status(PROVIDER, status, body));
        }

        let parsed: VoicesResponse = response
            .json()
            .await
            .map_err(|e| DomainError::malformed(PROVIDER, e.to_string()))?;

        Ok(parsed
            .voices
            .into_iter()
            .map(|v| Voice {
                voice_id: v.voice_id,
                name: v.name,
                category: v.category,
            })
            .collect())
    }
}

// -- wire types --

#[derive(Debug, Serialize)]
struct SynthesisRequest {
    text: String,
    model_id: String,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Debug, Deserialize)]
struct VoicesResponse {
    voices: Vec<WireVoice>,
}

#[derive(Debug, Deserialize)]
struct WireVoice {
    voice_id: String,
    name: String,
    #[serde(default)]
    category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_config_error() {
        temp_env::with_var_unset("ELEVENLABS_API_KEY", || {
            let err = ElevenLabsConfig::default().get_api_key().unwrap_err();
            assert!(matches!(
                err,
                DomainError::MissingApiKey { provider: "elevenlabs", .. }
            ));
        });
    }

    #[tokio::test]
    async fn test_synthesize_returns_audio_bytes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/text-to-speech/stub-voice")
            .match_header("xi-api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_body([0xFF, 0xFB, 0x90, 0x00])
            .create_async()
            .await;

        let client = ElevenLabsClient::new(ElevenLabsConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.url(),
            ..Default::default()
        })
        .unwrap();

        let audio = client.synthesize("deploy finished", "stub-voice").await.unwrap();
        assert_eq!(audio.bytes, vec![0xFF, 0xFB, 0x90, 0x00]);
        assert_eq!(audio.content_type, "audio/mpeg");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_voices_reshapes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/voices")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "voices": [
                        {"voice_id": "v1", "name": "Alice", "category": "premade"},
                        {"voice_id": "v2", "name": "Brian"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ElevenLabsClient::new(ElevenLabsConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.url(),
            ..Default::default()
        })
        .unwrap();

        let voices = client.list_voices().await.unwrap();
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[1].name, "Brian");
        assert!(voices[1].category.is_none());
    }
}
