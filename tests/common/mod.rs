//! Shared test backend

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tunekit_core::config::TrainingSettings;
use tunekit_core::error::{Error, Result};
use tunekit_core::runtime::{FragmentStream, ModelBackend, ParameterInfo, SamplingParams, TrainingRow};

/// Records calls and replays canned output.
#[derive(Default)]
pub struct RecordingBackend {
    pub fragments: Vec<String>,
    pub eos: Option<String>,
    pub embeddings: HashMap<String, Vec<Vec<f32>>>,
    pub prompts: Vec<(String, SamplingParams)>,
    pub trained: Vec<(Vec<TrainingRow>, Option<PathBuf>)>,
}

impl ModelBackend for RecordingBackend {
    fn generate<'a>(
        &'a mut self,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<FragmentStream<'a>> {
        self.prompts.push((prompt.to_string(), params.clone()));
        Ok(Box::new(self.fragments.iter().cloned().map(Ok)))
    }

    fn train(
        &mut self,
        rows: &[TrainingRow],
        _training: &TrainingSettings,
        resume_from: Option<&Path>,
    ) -> Result<()> {
        self.trained
            .push((rows.to_vec(), resume_from.map(Path::to_path_buf)));
        Ok(())
    }

    fn lookup_embeddings(&self, text: &str) -> Result<Vec<Vec<f32>>> {
        self.embeddings
            .get(text)
            .cloned()
            .ok_or_else(|| Error::backend(format!("unknown token {}", text)))
    }

    fn parameters(&self) -> Vec<ParameterInfo> {
        vec![
            ParameterInfo {
                name: "model.embed_tokens.weight".into(),
                shape: vec![32000, 4096],
            },
            ParameterInfo {
                name: "lora_A.weight".into(),
                shape: vec![16, 4096],
            },
        ]
    }

    fn eos_token(&self) -> Option<&str> {
        self.eos.as_deref()
    }
}
