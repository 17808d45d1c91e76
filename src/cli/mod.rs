//! Command-line interface for the quorum backend.

pub mod commands;
pub mod context;
pub mod output;

use clap::{Parser, Subcommand};

use crate::infrastructure::logging::scrubbing::scrub_for_log;

#[derive(Parser)]
#[command(name = "quorum")]
#[command(about = "Quorum - Slack assistant backend for AI and DevOps providers", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize quorum configuration and database
    Init(commands::init::InitArgs),

    /// Fan a prompt out to every chat provider and pick a consensus answer
    Ask(commands::ask::AskArgs),

    /// Grounded web search (single, batch, or claim verification)
    Search(commands::search::SearchArgs),

    /// Generate an image from a prompt
    Image(commands::image::ImageArgs),

    /// Synthesize speech from text
    Speak(commands::speak::SpeakArgs),

    /// Build the aggregated multi-provider security report
    SecurityReport(commands::security::SecurityArgs),

    /// Scan a file for secrets and anti-patterns
    Scan(commands::scan::ScanArgs),

    /// Task management commands
    #[command(subcommand)]
    Task(commands::task::TaskCommands),

    /// Memory management commands
    #[command(subcommand)]
    Memory(commands::memory::MemoryCommands),

    /// Vault secret commands
    #[command(subcommand)]
    Secret(commands::secret::SecretCommands),

    /// Show recent provider activity
    History(commands::history::HistoryArgs),

    /// Probe provider health
    Health(commands::health::HealthArgs),
}

/// Print a top-level error (scrubbed) and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let message = scrub_for_log(&format!("{err:#}"));
    if json_mode {
        eprintln!(
            "{}",
            serde_json::json!({ "success": false, "error": message })
        );
    } else {
        eprintln!("error: {message}");
    }
    std::process::exit(1);
}
