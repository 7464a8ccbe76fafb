use clap::Args;
use std::path::PathBuf;

/// Print the resolved settings
#[derive(Args, Debug)]
pub struct SettingsCommand {
    /// Settings file
    pub settings: PathBuf,
}

/// Report which adapter weights would be loaded
#[derive(Args, Debug)]
pub struct CheckpointCommand {
    /// Settings file
    pub settings: PathBuf,
}
