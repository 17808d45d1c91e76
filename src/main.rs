//! Quorum CLI entry point.

use clap::Parser;

use quorum::cli::{Cli, Commands};
use quorum::domain::models::LoggingConfig;
use quorum::infrastructure::config::ConfigLoader;
use quorum::infrastructure::logging;

#[tokio::main]
async fn main() {
    // Logging comes up before the command context so config errors are
    // visible; fall back to defaults when no config exists yet.
    let logging_config = ConfigLoader::load()
        .map(|c| c.logging)
        .unwrap_or_else(|_| LoggingConfig::default());
    if let Err(err) = logging::init(&logging_config) {
        eprintln!("failed to initialize logging: {err}");
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init(args) => quorum::cli::commands::init::execute(args, cli.json).await,
        Commands::Ask(args) => quorum::cli::commands::ask::execute(args, cli.json).await,
        Commands::Search(args) => quorum::cli::commands::search::execute(args, cli.json).await,
        Commands::Image(args) => quorum::cli::commands::image::execute(args, cli.json).await,
        Commands::Speak(args) => quorum::cli::commands::speak::execute(args, cli.json).await,
        Commands::SecurityReport(args) => {
            quorum::cli::commands::security::execute(args, cli.json).await
        }
        Commands::Scan(args) => quorum::cli::commands::scan::execute(args, cli.json).await,
        Commands::Task(command) => quorum::cli::commands::task::execute(command, cli.json).await,
        Commands::Memory(command) => {
            quorum::cli::commands::memory::execute(command, cli.json).await
        }
        Commands::Secret(command) => {
            quorum::cli::commands::secret::execute(command, cli.json).await
        }
        Commands::History(args) => quorum::cli::commands::history::execute(args, cli.json).await,
        Commands::Health(args) => quorum::cli::commands::health::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        quorum::cli::handle_error(err, cli.json);
    }
}
