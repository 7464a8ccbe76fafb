//! Train, generate, embed and stats routines.
//!
//! Each routine wires settings, templates and data into a [`ModelBackend`];
//! the backend itself owns model loading, the training loop and decoding.

use crate::config::Settings;
use crate::error::{ConfigError, Error, Result};
use crate::runtime::backend::{cosine_similarity, strip_eos, ModelBackend, SamplingParams};
use crate::runtime::template_engine::{TemplateEngine, OUTPUT_FIELD};
use crate::training::checkpoint::{ensure_not_overwriting, latest_checkpoint};
use crate::training::data_loader::{DataProcessor, Shuffle};
use std::fmt;
use std::io::Write;
use tracing::{info, warn};

/// Field holding the user query in generation prompts.
pub const INSTRUCTION_FIELD: &str = "instruction";

/// Fine-tune on the configured dataset, resuming from the latest checkpoint.
///
/// Returns the number of training rows handed to the backend.
pub fn train<B>(backend: &mut B, settings: &Settings, shuffle: Shuffle) -> Result<usize>
where
    B: ModelBackend + ?Sized,
{
    let training = &settings.training;
    ensure_not_overwriting(&training.output_path)?;

    let data_path = training
        .data_path
        .as_deref()
        .ok_or(ConfigError::Missing("training.dataPath"))?;
    let template = TemplateEngine::from_path(training.template_path.as_deref())?;
    let rows = DataProcessor::new(template).load_data(data_path, shuffle)?;
    info!("Training data length: {}", rows.len());

    let checkpoint = latest_checkpoint(&training.output_path)?;
    match &checkpoint {
        Some(path) => info!("Continuing fine-tune from checkpoint {}", path.display()),
        None => info!("Starting new fine-tune"),
    }

    backend.train(&rows, training, checkpoint.as_deref())?;
    Ok(rows.len())
}

/// Prompt for a query with an open response slot.
pub fn build_prompt(template: &TemplateEngine, query: &str) -> Result<String> {
    Ok(template.render([(INSTRUCTION_FIELD, query), (OUTPUT_FIELD, "")])?)
}

/// Stream the answer to `query` into `out` and return the full text.
pub fn generate<B, W>(
    backend: &mut B,
    template: &TemplateEngine,
    query: &str,
    params: &SamplingParams,
    out: &mut W,
) -> Result<String>
where
    B: ModelBackend + ?Sized,
    W: Write + ?Sized,
{
    let prompt = build_prompt(template, query)?;
    let eos = backend.eos_token().map(str::to_string);

    let mut full = String::new();
    for fragment in backend.generate(&prompt, params)? {
        let fragment = fragment?;
        let text = strip_eos(&fragment, eos.as_deref());
        out.write_all(text.as_bytes())?;
        out.flush()?;
        full.push_str(text);
    }
    Ok(full)
}

/// Pairwise cosine similarity of token embeddings
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityTable {
    pub title: String,
    pub labels: Vec<String>,
    /// `values[row][col]`
    pub values: Vec<Vec<f32>>,
}

impl fmt::Display for SimilarityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cosine Similarity ({})", self.title)?;
        write!(f, "{:8}", "")?;
        for label in &self.labels {
            write!(f, "{:>8}", label)?;
        }
        writeln!(f)?;
        for (label, row) in self.labels.iter().zip(&self.values) {
            write!(f, "{:8}", label)?;
            for value in row {
                write!(f, "{:8.3}", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Compare the first-token embeddings of every pair of `tokens`.
pub fn similarity_table<B>(backend: &B, title: &str, tokens: &[String]) -> Result<SimilarityTable>
where
    B: ModelBackend + ?Sized,
{
    let mut embeddings = Vec::with_capacity(tokens.len());
    for token in tokens {
        let vectors = backend.lookup_embeddings(token)?;
        if vectors.len() != 1 {
            warn!("Input {} does not tokenize into single token.", token);
        }
        let first = vectors
            .into_iter()
            .next()
            .ok_or_else(|| Error::backend(format!("no embedding for '{}'", token)))?;
        embeddings.push(first);
    }

    let values = embeddings
        .iter()
        .map(|row| {
            embeddings
                .iter()
                .map(|col| cosine_similarity(col, row))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SimilarityTable {
        title: title.to_string(),
        labels: tokens.to_vec(),
        values,
    })
}

/// One line per model parameter: name and shape.
pub fn parameter_report<B>(backend: &B) -> Vec<String>
where
    B: ModelBackend + ?Sized,
{
    backend
        .parameters()
        .into_iter()
        .map(|p| format!("{}  Shape: {:?}", p.name, p.shape))
        .collect()
}
