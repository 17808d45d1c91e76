//! Implementation of the `quorum history` command.
//!
//! Shows the durable usage log, or a channel's conversation log with
//! `--channel`; the in-memory ring only lives inside a running backend
//! process.

use anyhow::Result;
use clap::Args;

use crate::cli::context::AppContext;
use crate::cli::output::{format_usage_table, output, truncate, CommandOutput};
use crate::domain::models::{Conversation, UsageLog};
use crate::domain::ports::{ConversationRepository, UsageRepository};

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Maximum number of entries to display
    #[arg(short, long, default_value = "50")]
    pub limit: usize,

    /// Show a channel's conversation log instead of provider usage
    #[arg(short, long)]
    pub channel: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct HistoryOutput {
    pub entries: Vec<UsageLog>,
    pub conversations: Vec<Conversation>,
}

impl CommandOutput for HistoryOutput {
    fn to_human(&self) -> String {
        if !self.conversations.is_empty() {
            return self
                .conversations
                .iter()
                .map(|c| {
                    format!(
                        "{} [{}] {}: {}",
                        c.created_at.format("%Y-%m-%d %H:%M:%S"),
                        c.role.as_str(),
                        c.user_id,
                        truncate(&c.content, 100)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
        }
        if self.entries.is_empty() {
            "No activity recorded yet.".to_string()
        } else {
            format_usage_table(&self.entries)
        }
    }

    fn to_json(&self) -> serde_json::Value {
        if self.conversations.is_empty() {
            serde_json::to_value(&self.entries).unwrap_or_default()
        } else {
            serde_json::to_value(&self.conversations).unwrap_or_default()
        }
    }
}

pub async fn execute(args: HistoryArgs, json_mode: bool) -> Result<()> {
    let ctx = AppContext::load().await?;

    let output_data = if let Some(channel) = &args.channel {
        HistoryOutput {
            entries: vec![],
            conversations: ctx
                .conversations
                .recent_for_channel(channel, args.limit)
                .await?,
        }
    } else {
        HistoryOutput {
            entries: ctx.usage.recent_usage(args.limit).await?,
            conversations: vec![],
        }
    };

    output(&output_data, json_mode);
    Ok(())
}
