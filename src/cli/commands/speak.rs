//! Implementation of the `quorum speak` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::UsageLog;
use crate::domain::ports::UsageRepository;

#[derive(Args, Debug)]
pub struct SpeakArgs {
    /// Text to synthesize (omit with --list-voices)
    pub text: Option<String>,

    /// Voice identifier
    #[arg(short, long, default_value = "21m00Tcm4TlvDq8ikWAM")]
    pub voice: String,

    /// Where to write the audio
    #[arg(short, long, default_value = "quorum-speech.mp3")]
    pub out: PathBuf,

    /// List available voices instead of synthesizing
    #[arg(long)]
    pub list_voices: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct SpeakOutput {
    pub path: Option<PathBuf>,
    pub bytes: usize,
    pub content_type: Option<String>,
    pub voices: Vec<(String, String)>,
}

impl CommandOutput for SpeakOutput {
    fn to_human(&self) -> String {
        if !self.voices.is_empty() {
            let mut lines = vec!["Available voices:".to_string()];
            for (id, name) in &self.voices {
                lines.push(format!("  {id}  {name}"));
            }
            return lines.join("\n");
        }
        match &self.path {
            Some(path) => format!("Wrote {} bytes to {}", self.bytes, path.display()),
            None => "Nothing to do.".to_string(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: SpeakArgs, json_mode: bool) -> Result<()> {
    let ctx = AppContext::load().await?;
    let client = ctx.elevenlabs_client()?;

    if args.list_voices {
        let voices = client.list_voices().await?;
        let output_data = SpeakOutput {
            path: None,
            bytes: 0,
            content_type: None,
            voices: voices.into_iter().map(|v| (v.voice_id, v.name)).collect(),
        };
        output(&output_data, json_mode);
        return Ok(());
    }

    let text = args
        .text
        .context("Provide text to synthesize, or pass --list-voices")?;

    let started = std::time::Instant::now();
    let result = client.synthesize(&text, &args.voice).await;
    ctx.usage
        .log_usage(&UsageLog::new(
            "elevenlabs",
            "synthesize",
            text.len() as u64,
            started.elapsed().as_millis() as u64,
            result.is_ok(),
        ))
        .await?;
    let audio = result?;

    tokio::fs::write(&args.out, &audio.bytes)
        .await
        .with_context(|| format!("Failed to write {}", args.out.display()))?;

    let output_data = SpeakOutput {
        path: Some(args.out),
        bytes: audio.bytes.len(),
        content_type: Some(audio.content_type),
        voices: Vec::new(),
    };
    output(&output_data, json_mode);
    Ok(())
}
