//! Implementation of the `quorum image` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::UsageLog;
use crate::domain::ports::UsageRepository;

#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Prompt describing the image
    pub prompt: String,

    /// Where to write the image
    #[arg(short, long, default_value = "quorum-image.png")]
    pub out: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct ImageOutput {
    pub path: PathBuf,
    pub bytes: usize,
    pub seed: Option<u64>,
    pub finish_reason: Option<String>,
}

impl CommandOutput for ImageOutput {
    fn to_human(&self) -> String {
        format!(
            "Wrote {} bytes to {}{}",
            self.bytes,
            self.path.display(),
            self.finish_reason
                .as_deref()
                .map(|r| format!(" ({r})"))
                .unwrap_or_default()
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ImageArgs, json_mode: bool) -> Result<()> {
    let ctx = AppContext::load().await?;
    let client = ctx.stability_client()?;

    let started = std::time::Instant::now();
    let result = client.generate_image(&args.prompt).await;
    ctx.usage
        .log_usage(&UsageLog::new(
            "stability",
            "generate_image",
            1,
            started.elapsed().as_millis() as u64,
            result.is_ok(),
        ))
        .await?;
    let image = result?;

    tokio::fs::write(&args.out, &image.bytes)
        .await
        .with_context(|| format!("Failed to write {}", args.out.display()))?;

    let output_data = ImageOutput {
        path: args.out,
        bytes: image.bytes.len(),
        seed: image.seed,
        finish_reason: image.finish_reason,
    };
    output(&output_data, json_mode);
    Ok(())
}
