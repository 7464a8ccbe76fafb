use clap::Args;
use std::path::PathBuf;

/// Render a prompt with the inference template
#[derive(Args, Debug)]
pub struct PromptCommand {
    /// Settings file
    pub settings: PathBuf,

    /// Instruction text
    pub query: String,

    /// Optional input field
    #[arg(long)]
    pub input: Option<String>,

    /// Response text; left empty for generation prompts
    #[arg(long, default_value = "")]
    pub output: String,
}

/// Template the training dataset into JSON Lines rows
#[derive(Args, Debug)]
pub struct PrepareCommand {
    /// Settings file
    pub settings: PathBuf,

    /// Destination file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Shuffle with a fixed seed
    #[arg(long, conflicts_with = "no_shuffle")]
    pub seed: Option<u64>,

    /// Keep dataset order
    #[arg(long)]
    pub no_shuffle: bool,
}
