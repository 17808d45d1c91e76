//! Implementation of the `quorum memory` commands.

use anyhow::Result;
use clap::Subcommand;

use crate::cli::context::AppContext;
use crate::cli::output::{format_memory_table, output, CommandOutput};
use crate::domain::models::Memory;

#[derive(Subcommand, Debug)]
pub enum MemoryCommands {
    /// Store or replace a fact
    Set {
        key: String,
        value: String,

        /// Grouping category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Look a fact up by key
    Get { key: String },

    /// List stored facts
    List {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,

        /// Maximum number to display
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Delete a fact
    Delete { key: String },
}

#[derive(Debug, serde::Serialize)]
pub struct MemoryOutput {
    pub memories: Vec<Memory>,
    pub message: Option<String>,
}

impl CommandOutput for MemoryOutput {
    fn to_human(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        if self.memories.is_empty() {
            "No memories found.".to_string()
        } else {
            format_memory_table(&self.memories)
        }
    }

    fn to_json(&self) -> serde_json::Value {
        if self.memories.len() == 1 {
            serde_json::to_value(&self.memories[0]).unwrap_or_default()
        } else {
            serde_json::to_value(&self.memories).unwrap_or_default()
        }
    }
}

pub async fn execute(command: MemoryCommands, json_mode: bool) -> Result<()> {
    let ctx = AppContext::load().await?;
    let service = ctx.memory_service();

    let output_data = match command {
        MemoryCommands::Set {
            key,
            value,
            category,
        } => {
            let memory = service
                .remember(&key, &value, category.as_deref())
                .await?;
            MemoryOutput {
                message: Some(format!("Stored {}", memory.key)),
                memories: vec![memory],
            }
        }
        MemoryCommands::Get { key } => {
            let memory = service.recall(&key).await?;
            MemoryOutput {
                memories: vec![memory],
                message: None,
            }
        }
        MemoryCommands::List { category, limit } => MemoryOutput {
            memories: service.list(category.as_deref(), limit).await?,
            message: None,
        },
        MemoryCommands::Delete { key } => {
            service.forget(&key).await?;
            MemoryOutput {
                memories: vec![],
                message: Some(format!("Deleted {key}")),
            }
        }
    };

    output(&output_data, json_mode);
    Ok(())
}
