//! Implementation of the `quorum health` command.

use anyhow::Result;
use clap::Args;

use crate::cli::context::AppContext;
use crate::cli::output::{format_health_table, output, CommandOutput};
use crate::domain::models::HealthCheck;

#[derive(Args, Debug)]
pub struct HealthArgs {}

#[derive(Debug, serde::Serialize)]
pub struct HealthOutput {
    pub checks: Vec<HealthCheck>,
}

impl CommandOutput for HealthOutput {
    fn to_human(&self) -> String {
        format_health_table(&self.checks)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.checks).unwrap_or_default()
    }
}

pub async fn execute(_args: HealthArgs, json_mode: bool) -> Result<()> {
    let ctx = AppContext::load().await?;
    let service = ctx.health_service()?;
    let checks = service.check_all().await?;
    output(&HealthOutput { checks }, json_mode);
    Ok(())
}
