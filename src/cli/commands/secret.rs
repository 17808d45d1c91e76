//! Implementation of the `quorum secret` commands (Vault KV v2).

use anyhow::Result;
use clap::Subcommand;
use std::collections::HashMap;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::ports::SecretStore;

#[derive(Subcommand, Debug)]
pub enum SecretCommands {
    /// Read every field of a secret
    Get { path: String },

    /// Write key=value pairs to a secret
    Set {
        path: String,

        /// Fields as key=value
        #[arg(required = true)]
        fields: Vec<String>,
    },

    /// List child keys under a path
    List {
        #[arg(default_value = "")]
        path: String,
    },

    /// Delete the latest version of a secret
    Delete { path: String },
}

#[derive(Debug, serde::Serialize)]
pub struct SecretOutput {
    pub fields: HashMap<String, String>,
    pub keys: Vec<String>,
    pub message: Option<String>,
}

impl CommandOutput for SecretOutput {
    fn to_human(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        if !self.keys.is_empty() {
            return self.keys.join("\n");
        }
        let mut lines: Vec<String> = self
            .fields
            .iter()
            .map(|(k, v)| format!("{k} = {v}"))
            .collect();
        lines.sort();
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(command: SecretCommands, json_mode: bool) -> Result<()> {
    let ctx = AppContext::load().await?;
    let vault = ctx.vault_client()?;

    let output_data = match command {
        SecretCommands::Get { path } => SecretOutput {
            fields: vault.read_secret(&path).await?,
            keys: vec![],
            message: None,
        },
        SecretCommands::Set { path, fields } => {
            let mut data = HashMap::new();
            for field in &fields {
                let (key, value) = field.split_once('=').ok_or_else(|| {
                    anyhow::anyhow!("Field must be given as key=value: {field}")
                })?;
                data.insert(key.to_string(), value.to_string());
            }
            vault.write_secret(&path, &data).await?;
            SecretOutput {
                fields: HashMap::new(),
                keys: vec![],
                message: Some(format!("Wrote {} field(s) to {path}", data.len())),
            }
        }
        SecretCommands::List { path } => SecretOutput {
            fields: HashMap::new(),
            keys: vault.list_secrets(&path).await?,
            message: None,
        },
        SecretCommands::Delete { path } => {
            vault.delete_secret(&path).await?;
            SecretOutput {
                fields: HashMap::new(),
                keys: vec![],
                message: Some(format!("Deleted {path}")),
            }
        }
    };

    output(&output_data, json_mode);
    Ok(())
}
