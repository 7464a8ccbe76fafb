use crate::cli::commands::{
    CheckpointCommand, PrepareCommand, PromptCommand, SettingsCommand,
};
use crate::config::Settings;
use crate::launcher::launch;
use crate::orchestration::INSTRUCTION_FIELD;
use crate::runtime::backend::SamplingParams;
use crate::runtime::template_engine::{TemplateEngine, INPUT_FIELD, OUTPUT_FIELD};
use crate::training::checkpoint::{is_finalized, resolve_adapter, AdapterSource};
use crate::training::data_loader::{DataProcessor, Shuffle};
use anyhow::{Context, Result};
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

fn load_settings(name: &Path) -> Result<Settings> {
    let settings = Settings::load(name)
        .with_context(|| format!("Failed to load settings from {}", name.display()))?;
    debug!("\n{}", settings.describe());
    Ok(settings)
}

pub fn handle_settings(cmd: SettingsCommand) -> Result<()> {
    launch(&cmd.settings, |name| -> Result<()> {
        let settings = load_settings(name)?;
        println!("{}", settings.describe());
        Ok(())
    })
    .context("Failed to enter settings directory")?
}

pub fn handle_prompt(cmd: PromptCommand) -> Result<()> {
    launch(&cmd.settings, |name| -> Result<()> {
        let settings = load_settings(name)?;
        let template = TemplateEngine::from_path(settings.inference.template_path.as_deref())
            .context("Failed to load inference template")?;
        let params = SamplingParams::from(&settings.inference);
        debug!(
            limit = params.limit,
            temperature = params.temperature,
            top_p = params.top_p,
            top_k = params.top_k,
            input_fields = %settings.ui.input_fields,
            "Sampling defaults"
        );

        let input = cmd.input.as_deref().unwrap_or("");
        let prompt = template
            .render([
                (INSTRUCTION_FIELD, cmd.query.as_str()),
                (INPUT_FIELD, input),
                (OUTPUT_FIELD, cmd.output.as_str()),
            ])
            .context("Failed to render prompt")?;
        println!("{}", prompt);
        Ok(())
    })
    .context("Failed to enter settings directory")?
}

pub fn handle_prepare(cmd: PrepareCommand) -> Result<()> {
    // The destination is relative to where the command was started.
    let output = env::current_dir()?.join(&cmd.output);
    let shuffle = match (cmd.no_shuffle, cmd.seed) {
        (true, _) => Shuffle::None,
        (false, Some(seed)) => Shuffle::Seeded(seed),
        (false, None) => Shuffle::Random,
    };

    launch(&cmd.settings, |name| -> Result<()> {
        let settings = load_settings(name)?;
        let data_path = settings
            .training
            .data_path
            .as_deref()
            .context("training.dataPath is not set")?;
        let template = TemplateEngine::from_path(settings.training.template_path.as_deref())
            .context("Failed to load training template")?;

        let rows = DataProcessor::new(template)
            .load_data(data_path, shuffle)
            .with_context(|| format!("Failed to prepare {}", data_path.display()))?;

        let file = File::create(&output)
            .with_context(|| format!("Failed to create {}", output.display()))?;
        let mut writer = BufWriter::new(file);
        for row in &rows {
            serde_json::to_writer(&mut writer, row)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        info!("Wrote {} training rows to {}", rows.len(), output.display());
        Ok(())
    })
    .context("Failed to enter settings directory")?
}

pub fn handle_checkpoint(cmd: CheckpointCommand) -> Result<()> {
    launch(&cmd.settings, |name| -> Result<()> {
        let settings = load_settings(name)?;
        match resolve_adapter(&settings)? {
            AdapterSource::Finalized(path) => println!("Finalized adapter: {}", path.display()),
            AdapterSource::Checkpoint(path) => println!("Checkpoint: {}", path.display()),
            AdapterSource::Fresh => println!("No adapter on disk; a new one will be created"),
        }
        if is_finalized(&settings.training.output_path) {
            println!(
                "Training output {} is finished; remove it to train again",
                settings.training.output_path.display()
            );
        }
        Ok(())
    })
    .context("Failed to enter settings directory")?
}
