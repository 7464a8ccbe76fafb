//! tunekit binary.
//!
//! Inspects fine-tuning settings, renders prompts and prepares templated
//! training data.

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};
use tunekit_core::cli::{
    commands::{Commands, LoggingConfig},
    handle_checkpoint, handle_prepare, handle_prompt, handle_settings,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub logging: LoggingConfig,

    #[command(subcommand)]
    pub command: Commands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = cli.logging.get_effective_level();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.parse().unwrap_or(LevelFilter::INFO).into())
                .parse_lossy(cli.logging.log_filter.as_deref().unwrap_or("")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    debug!("tunekit starting up");

    match cli.command {
        Commands::Settings(cmd) => handle_settings(cmd),
        Commands::Prompt(cmd) => handle_prompt(cmd),
        Commands::Prepare(cmd) => handle_prepare(cmd),
        Commands::Checkpoint(cmd) => handle_checkpoint(cmd),
    }
}
