//! Interface to the model backend that loads checkpoints, trains adapters and
//! generates text.

use crate::config::{InferenceSettings, TrainingSettings};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sampling parameters for one generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Maximum new tokens
    pub limit: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: usize,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            limit: 128,
            temperature: 0.1,
            top_p: 0.75,
            top_k: 40,
        }
    }
}

impl From<&InferenceSettings> for SamplingParams {
    fn from(settings: &InferenceSettings) -> Self {
        Self {
            limit: settings.max_length / 2,
            temperature: settings.temperature,
            top_p: settings.top_p,
            top_k: settings.top_k,
        }
    }
}

/// One templated training example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRow {
    pub input: String,
}

/// Name and shape of a model parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    pub shape: Vec<usize>,
}

/// Lazily produced generation fragments.
pub type FragmentStream<'a> = Box<dyn Iterator<Item = Result<String>> + 'a>;

/// Model backend with an adapter already applied.
pub trait ModelBackend {
    /// Stream text generated after `prompt`.
    fn generate<'a>(&'a mut self, prompt: &str, params: &SamplingParams)
        -> Result<FragmentStream<'a>>;

    /// Fine-tune the adapter, persisting checkpoints under the output path.
    fn train(
        &mut self,
        rows: &[TrainingRow],
        training: &TrainingSettings,
        resume_from: Option<&Path>,
    ) -> Result<()>;

    /// Input embeddings of `text`, one vector per token.
    fn lookup_embeddings(&self, text: &str) -> Result<Vec<Vec<f32>>>;

    fn parameters(&self) -> Vec<ParameterInfo>;

    fn eos_token(&self) -> Option<&str> {
        None
    }
}

/// Remove one trailing EOS marker from a generated fragment.
pub fn strip_eos<'a>(fragment: &'a str, eos: Option<&str>) -> &'a str {
    match eos {
        Some(eos) if !eos.is_empty() => fragment.strip_suffix(eos).unwrap_or(fragment),
        _ => fragment,
    }
}

/// Cosine similarity of two vectors; zero when either has no magnitude.
///
/// Vectors of different dimension are an error.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::backend(format!(
            "embedding dimensions differ: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot / (norm_a * norm_b))
    }
}
