//! Generative AI provider clients.
//!
//! Each client is a thin wrapper over one vendor HTTP API: check the
//! credential, build the request from parameters plus configured
//! defaults, issue one call, reshape the JSON. No retries.

pub mod elevenlabs;
pub mod openai;
pub mod perplexity;
pub mod stability;

pub use elevenlabs::{ElevenLabsClient, ElevenLabsConfig};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use perplexity::{PerplexityClient, PerplexityConfig};
pub use stability::{StabilityClient, StabilityConfig};
