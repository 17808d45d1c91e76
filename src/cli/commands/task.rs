//! Implementation of the `quorum task` commands.

use anyhow::{Context, Result};
use clap::Subcommand;
use uuid::Uuid;

use crate::cli::context::AppContext;
use crate::cli::output::{format_task_table, output, truncate, CommandOutput};
use crate::domain::models::{AiResponse, ConsensusResult, Task, TaskStatus};
use crate::domain::ports::{ResponseRepository, TaskRepository, UsageRepository};

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List recent tasks
    List {
        /// Filter by status (pending, running, completed, failed)
        #[arg(short, long)]
        status: Option<String>,

        /// Maximum number of tasks to display
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Show one task with its responses and consensus
    Show {
        /// Task ID
        task_id: Uuid,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct TaskListOutput {
    pub tasks: Vec<Task>,
}

impl CommandOutput for TaskListOutput {
    fn to_human(&self) -> String {
        if self.tasks.is_empty() {
            "No tasks found.".to_string()
        } else {
            format_task_table(&self.tasks)
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.tasks).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct TaskShowOutput {
    pub task: Task,
    pub responses: Vec<AiResponse>,
    pub consensus: Option<ConsensusResult>,
    pub changes: Vec<String>,
}

impl CommandOutput for TaskShowOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Task {}", self.task.id),
            format!("  kind:   {}", self.task.kind),
            format!("  status: {}", self.task.status.as_str()),
            format!("  prompt: {}", truncate(&self.task.prompt, 120)),
            String::new(),
        ];

        for response in &self.responses {
            let is_winner =
                Some(response.id) == self.consensus.as_ref().map(|c| c.winning_response_id);
            let marker = if is_winner { " (winner)" } else { "" };
            match (&response.content, &response.error) {
                (Some(content), _) => lines.push(format!(
                    "  {}{marker}: {} [{} ms]",
                    response.provider,
                    truncate(content, 100),
                    response.latency_ms
                )),
                (None, Some(error)) => lines.push(format!(
                    "  {}: error: {}",
                    response.provider,
                    truncate(error, 100)
                )),
                _ => {}
            }
        }

        if !self.changes.is_empty() {
            lines.push(String::new());
            lines.push("History:".to_string());
            for change in &self.changes {
                lines.push(format!("  - {change}"));
            }
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(command: TaskCommands, json_mode: bool) -> Result<()> {
    let ctx = AppContext::load().await?;

    match command {
        TaskCommands::List { status, limit } => {
            let status = status
                .map(|s| {
                    TaskStatus::from_str(&s).with_context(|| format!("Unknown task status: {s}"))
                })
                .transpose()?;
            let tasks = ctx.tasks.list(status, limit).await?;
            output(&TaskListOutput { tasks }, json_mode);
        }
        TaskCommands::Show { task_id } => {
            let task = ctx
                .tasks
                .get(task_id)
                .await?
                .with_context(|| format!("Task not found: {task_id}"))?;
            let responses = ctx.responses.responses_for_task(task_id).await?;
            let consensus = ctx.responses.consensus_for_task(task_id).await?;
            let changes = ctx
                .usage
                .changes_for("tasks", &task_id.to_string())
                .await?
                .into_iter()
                .map(|c| {
                    format!(
                        "{} {} {}",
                        c.created_at.format("%Y-%m-%d %H:%M:%S"),
                        c.action,
                        c.detail.unwrap_or_default()
                    )
                })
                .collect();

            output(
                &TaskShowOutput {
                    task,
                    responses,
                    consensus,
                    changes,
                },
                json_mode,
            );
        }
    }
    Ok(())
}
