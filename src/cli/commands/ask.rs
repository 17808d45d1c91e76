//! Implementation of the `quorum ask` command: one consensus run.

use anyhow::Result;
use clap::Args;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Conversation, ConversationRole};
use crate::domain::ports::ConversationRepository;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The prompt to fan out to every chat provider
    pub prompt: String,

    /// Task kind label
    #[arg(short, long, default_value = "ask")]
    pub kind: String,

    /// Conversation channel to log under
    #[arg(short, long, default_value = "cli")]
    pub channel: String,
}

#[derive(Debug, serde::Serialize)]
pub struct AskOutput {
    pub task_id: String,
    pub status: String,
    pub providers_answered: usize,
    pub providers_failed: usize,
    pub winner: Option<String>,
    pub score: Option<f64>,
    pub answer: Option<String>,
}

impl CommandOutput for AskOutput {
    fn to_human(&self) -> String {
        match (&self.answer, &self.winner) {
            (Some(answer), Some(winner)) => format!(
                "{answer}\n\n[task {} | winner {winner} ({:.3}) | {} answered, {} failed]",
                self.task_id,
                self.score.unwrap_or_default(),
                self.providers_answered,
                self.providers_failed,
            ),
            _ => format!(
                "All providers failed (task {} marked {}).",
                self.task_id, self.status
            ),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: AskArgs, json_mode: bool) -> Result<()> {
    let ctx = AppContext::load().await?;
    let service = ctx.consensus_service()?;

    ctx.conversations
        .append(&Conversation::new(
            &args.channel,
            "cli",
            ConversationRole::User,
            &args.prompt,
        ))
        .await?;

    let outcome = service.run_task(&args.kind, &args.prompt).await?;

    if let Some(answer) = &outcome.winning_content {
        ctx.conversations
            .append(&Conversation::new(
                &args.channel,
                "bot",
                ConversationRole::Assistant,
                answer,
            ))
            .await?;
    }

    let winner = outcome.consensus.as_ref().and_then(|c| {
        outcome
            .responses
            .iter()
            .find(|r| r.id == c.winning_response_id)
            .map(|r| r.provider.clone())
    });

    let output_data = AskOutput {
        task_id: outcome.task.id.to_string(),
        status: outcome.task.status.as_str().to_string(),
        providers_answered: outcome.responses.iter().filter(|r| r.is_success()).count(),
        providers_failed: outcome.responses.iter().filter(|r| !r.is_success()).count(),
        winner,
        score: outcome.consensus.as_ref().map(|c| c.score),
        answer: outcome.winning_content,
    };
    output(&output_data, json_mode);
    Ok(())
}
