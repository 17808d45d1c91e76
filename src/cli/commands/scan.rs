//! Implementation of the `quorum scan` command.
//!
//! Runs the fixed-pattern secret/anti-pattern scanner over a local file
//! or over a file fetched from GitHub via the contents endpoint.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::adapters::devops::{GitHubClient, GitHubConfig};
use crate::services::{Finding, SecretScanner};

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Local file to scan
    #[arg(short, long, conflicts_with = "repo")]
    pub file: Option<PathBuf>,

    /// Repository as "owner/repo" to fetch from instead
    #[arg(long, requires = "path")]
    pub repo: Option<String>,

    /// Path within the repository
    #[arg(long)]
    pub path: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct ScanOutput {
    pub subject: String,
    pub findings: Vec<ScanFinding>,
}

#[derive(Debug, serde::Serialize)]
pub struct ScanFinding {
    pub pattern: String,
    pub severity: String,
    pub line: usize,
    pub excerpt: String,
}

impl From<Finding> for ScanFinding {
    fn from(finding: Finding) -> Self {
        Self {
            pattern: finding.pattern.to_string(),
            severity: finding.severity.as_str().to_string(),
            line: finding.line,
            excerpt: finding.excerpt,
        }
    }
}

impl CommandOutput for ScanOutput {
    fn to_human(&self) -> String {
        if self.findings.is_empty() {
            return format!("{}: clean", self.subject);
        }
        let mut lines = vec![format!(
            "{}: {} finding(s)",
            self.subject,
            self.findings.len()
        )];
        for finding in &self.findings {
            lines.push(format!(
                "  line {:>4}  [{}] {}: {}",
                finding.line, finding.severity, finding.pattern, finding.excerpt
            ));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ScanArgs, json_mode: bool) -> Result<()> {
    let (subject, text) = match (&args.file, &args.repo, &args.path) {
        (Some(file), _, _) => {
            let text = tokio::fs::read_to_string(file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            (file.display().to_string(), text)
        }
        (None, Some(repo), Some(path)) => {
            let (owner, name) = repo
                .split_once('/')
                .context("Repository must be given as owner/repo")?;
            let ctx = AppContext::load().await?;
            let client = GitHubClient::new(GitHubConfig::from_provider_config(
                &ctx.config.providers.github,
            ))?;
            let file = client.get_contents(owner, name, path).await?;
            (format!("{repo}:{path}"), file.content)
        }
        _ => anyhow::bail!("Provide --file, or --repo with --path"),
    };

    let scanner = SecretScanner::new();
    let findings = scanner
        .scan(&text)
        .into_iter()
        .map(ScanFinding::from)
        .collect();

    output(&ScanOutput { subject, findings }, json_mode);
    Ok(())
}
