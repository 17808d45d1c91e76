//! Generated media results from the image and speech providers.

use serde::{Deserialize, Serialize};

/// An image returned by the Stability endpoint, decoded from base64.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedImage {
    pub prompt: String,
    #[serde(skip_serializing)]
    pub bytes: Vec<u8>,
    /// Output format as requested, e.g. "png".
    pub format: String,
    /// Seed the provider reports for the generation.
    pub seed: Option<u64>,
    /// Finish reason, e.g. "SUCCESS" or "CONTENT_FILTERED".
    pub finish_reason: Option<String>,
}

/// Synthesized speech audio from ElevenLabs.
#[derive(Debug, Clone, Serialize)]
pub struct SpeechAudio {
    pub voice_id: String,
    #[serde(skip_serializing)]
    pub bytes: Vec<u8>,
    /// Content type reported by the provider, e.g. "audio/mpeg".
    pub content_type: String,
}

/// A voice available for synthesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voice {
    pub voice_id: String,
    pub name: String,
    pub category: Option<String>,
}
