//! Implementation of the `quorum security-report` command.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::context::AppContext;
use crate::cli::output::{format_security_report, output, CommandOutput};
use crate::domain::models::SecurityReport;
use crate::services::ScanTargets;

#[derive(Args, Debug)]
pub struct SecurityArgs {
    /// Repository as "owner/repo"
    pub repo: String,

    /// Snyk org slug (enables the Snyk section)
    #[arg(long)]
    pub snyk_org: Option<String>,

    /// Snyk project id
    #[arg(long)]
    pub snyk_project: Option<String>,

    /// SonarQube project key (enables the SonarQube section)
    #[arg(long)]
    pub sonar_project: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct SecurityOutput {
    pub report: SecurityReport,
}

impl CommandOutput for SecurityOutput {
    fn to_human(&self) -> String {
        format_security_report(&self.report)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.report).unwrap_or_default()
    }
}

pub async fn execute(args: SecurityArgs, json_mode: bool) -> Result<()> {
    let (owner, repo) = args
        .repo
        .split_once('/')
        .context("Repository must be given as owner/repo")?;

    let ctx = AppContext::load().await?;
    let builder = ctx.security_report_builder()?;

    let targets = ScanTargets {
        snyk_org: args.snyk_org,
        snyk_project: args.snyk_project,
        sonar_project_key: args.sonar_project,
    };
    let report = builder.build(owner, repo, &targets).await?;

    output(&SecurityOutput { report }, json_mode);
    Ok(())
}
