pub mod config;
pub mod prepare;
pub mod settings;

pub use config::LoggingConfig;
pub use prepare::{PrepareCommand, PromptCommand};
pub use settings::{CheckpointCommand, SettingsCommand};

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the resolved settings
    Settings(SettingsCommand),
    /// Render a prompt with the inference template
    Prompt(PromptCommand),
    /// Template the training data into JSON Lines
    Prepare(PrepareCommand),
    /// Show which adapter weights would be loaded
    Checkpoint(CheckpointCommand),
}
