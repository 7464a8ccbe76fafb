//! Settings resolution for tunekit.
//!
//! A settings document (JSON, or TOML when the file ends in `.toml`) is parsed
//! into typed sections with per-field defaults, validated, and then passed
//! through a single normalization pass that fills cascaded values:
//!
//! 1. `inference.templatePath` from the top-level `templatePath`
//! 2. `training.templatePath` from the top-level `templatePath`
//! 3. `adapter.path` from the settings file base name
//! 4. `training.outputPath` from the settings file base name
//! 5. `ui.templatePath` from the top-level `templatePath`
//!
//! Each step only applies when its target is unset. Relative paths are kept as
//! written; they are resolved against the working directory chosen by the
//! launcher.

use crate::error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The only adapter type the backend can inject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdapterType {
    #[default]
    #[serde(rename = "LoRA")]
    LoRA,
}

impl fmt::Display for AdapterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterType::LoRA => write!(f, "LoRA"),
        }
    }
}

/// Pretrained model to load
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseSettings {
    /// Model path or hub identifier
    pub path: String,
    /// Quantization bit-width (4, 8 or 16)
    #[serde(default = "default_bits")]
    pub bits: u8,
}

/// Adapter injected on top of the base model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterSettings {
    /// Adapter to load; defaults to the settings base name
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: PathBuf,
    #[serde(rename = "type", default)]
    pub kind: AdapterType,
    /// Target modules, given either as a list or a comma-separated string
    #[serde(default, deserialize_with = "deserialize_modules")]
    pub lora_modules: Vec<String>,
    #[serde(default = "default_lora_r")]
    pub lora_r: usize,
    #[serde(default = "default_lora_alpha")]
    pub lora_alpha: usize,
    #[serde(default = "default_lora_dropout")]
    pub lora_dropout: f32,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            kind: AdapterType::default(),
            lora_modules: Vec::new(),
            lora_r: default_lora_r(),
            lora_alpha: default_lora_alpha(),
            lora_dropout: default_lora_dropout(),
        }
    }
}

/// Fine-tuning run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSettings {
    #[serde(default)]
    pub data_path: Option<PathBuf>,
    /// Where checkpoints and the final adapter go; defaults to the settings base name
    #[serde(default, deserialize_with = "null_as_default")]
    pub output_path: PathBuf,
    #[serde(default)]
    pub template_path: Option<PathBuf>,

    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default)]
    pub weight_decay: f64,
    /// Maximum tokens per training row
    #[serde(default = "default_cutoff")]
    pub cutoff: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_accumulation_steps")]
    pub accumulation_steps: usize,
    #[serde(default)]
    pub group_by_length: bool,
    #[serde(default = "default_warmup_steps")]
    pub warmup_steps: usize,
    #[serde(default = "default_checkpoint_steps")]
    pub checkpoint_steps: usize,
    /// Number of checkpoints kept on disk
    #[serde(default = "default_checkpoint_limit")]
    pub checkpoint_limit: usize,
    #[serde(default = "default_logging_steps")]
    pub logging_steps: usize,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            data_path: None,
            output_path: PathBuf::new(),
            template_path: None,
            epochs: default_epochs(),
            learning_rate: default_learning_rate(),
            weight_decay: 0.0,
            cutoff: default_cutoff(),
            batch_size: default_batch_size(),
            accumulation_steps: default_accumulation_steps(),
            group_by_length: false,
            warmup_steps: default_warmup_steps(),
            checkpoint_steps: default_checkpoint_steps(),
            checkpoint_limit: default_checkpoint_limit(),
            logging_steps: default_logging_steps(),
        }
    }
}

/// Generation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceSettings {
    #[serde(default)]
    pub template_path: Option<PathBuf>,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p", alias = "top_p")]
    pub top_p: f32,
    #[serde(default = "default_top_k", alias = "top_k")]
    pub top_k: usize,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            template_path: None,
            max_length: default_max_length(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSettings {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub template_path: Option<PathBuf>,
    #[serde(default = "default_input_fields")]
    pub input_fields: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            title: String::new(),
            template_path: None,
            input_fields: default_input_fields(),
        }
    }
}

/// Fully resolved settings for one process invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub base: BaseSettings,
    #[serde(default)]
    pub adapter: AdapterSettings,
    #[serde(default)]
    pub training: TrainingSettings,
    #[serde(default)]
    pub inference: InferenceSettings,
    #[serde(default)]
    pub ui: UiSettings,
    /// Template document used by every section that does not name its own
    #[serde(default)]
    pub template_path: Option<PathBuf>,
}

/// Settings document syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Json,
    Toml,
}

impl SettingsFormat {
    /// Pick the format from the file extension; anything but `.toml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => SettingsFormat::Toml,
            _ => SettingsFormat::Json,
        }
    }
}

impl Settings {
    /// Load, validate and normalize the settings document at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let base = base_name(path);
        debug!(path = %path.display(), base_name = %base.display(), "Loading settings");

        Self::parse(&contents, SettingsFormat::from_path(path), &base).map_err(|err| match err {
            ConfigError::Invalid(message) => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Parse settings from an in-memory document.
    ///
    /// `base_name` stands in for the settings file name without extension and
    /// feeds the adapter and output path defaults.
    pub fn parse(
        contents: &str,
        format: SettingsFormat,
        base_name: &Path,
    ) -> Result<Self, ConfigError> {
        let parsed: std::result::Result<Settings, String> = match format {
            SettingsFormat::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
            SettingsFormat::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
        };
        let mut settings = parsed.map_err(ConfigError::Invalid)?;

        settings.validate()?;
        settings.normalize(base_name);
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.base.path.trim().is_empty() {
            return Err(ConfigError::Missing("base.path"));
        }
        if !matches!(self.base.bits, 4 | 8 | 16) {
            return Err(ConfigError::InvalidBits(self.base.bits));
        }
        Ok(())
    }

    fn normalize(&mut self, base_name: &Path) {
        self.template_path = non_empty(self.template_path.take());

        self.inference.template_path = non_empty(self.inference.template_path.take())
            .or_else(|| self.template_path.clone());
        self.training.template_path = non_empty(self.training.template_path.take())
            .or_else(|| self.template_path.clone());

        if self.adapter.path.as_os_str().is_empty() {
            self.adapter.path = base_name.to_path_buf();
        }
        if self.training.output_path.as_os_str().is_empty() {
            self.training.output_path = base_name.to_path_buf();
        }

        self.ui.template_path =
            non_empty(self.ui.template_path.take()).or_else(|| self.template_path.clone());
    }

    /// Human-readable dump of every resolved section.
    pub fn describe(&self) -> String {
        let template_path = self
            .template_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string());

        [
            "=== SETTINGS ========================".to_string(),
            format!("Base: {}", section(&self.base)),
            format!("Adapter: {}", section(&self.adapter)),
            format!("Training: {}", section(&self.training)),
            format!("Inference: {}", section(&self.inference)),
            format!("UI: {}", section(&self.ui)),
            format!("templatePath: {}", template_path),
            "=====================================".to_string(),
        ]
        .join("\n")
    }
}

/// The settings path with the extension of its file name removed.
pub fn base_name(path: &Path) -> PathBuf {
    match path.extension() {
        Some(_) => path.with_extension(""),
        None => path.to_path_buf(),
    }
}

fn non_empty(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}

fn section<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("<unprintable: {}>", e))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModuleList {
    Joined(String),
    List(Vec<String>),
}

fn deserialize_modules<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let modules = match Option::<ModuleList>::deserialize(deserializer)? {
        Some(ModuleList::Joined(joined)) => joined.split(',').map(str::to_string).collect(),
        Some(ModuleList::List(list)) => list,
        None => Vec::new(),
    };
    Ok(modules
        .into_iter()
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect())
}

/// An explicit `null` counts as unset.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_bits() -> u8 {
    8
}

fn default_lora_r() -> usize {
    16
}

fn default_lora_alpha() -> usize {
    16
}

fn default_lora_dropout() -> f32 {
    0.05
}

fn default_epochs() -> usize {
    10
}

fn default_learning_rate() -> f64 {
    3e-4
}

fn default_cutoff() -> usize {
    256
}

fn default_batch_size() -> usize {
    4
}

fn default_accumulation_steps() -> usize {
    32
}

fn default_warmup_steps() -> usize {
    100
}

fn default_checkpoint_steps() -> usize {
    100
}

fn default_checkpoint_limit() -> usize {
    5
}

fn default_logging_steps() -> usize {
    10
}

fn default_max_length() -> usize {
    1024
}

fn default_temperature() -> f32 {
    0.05
}

fn default_top_p() -> f32 {
    0.9
}

fn default_top_k() -> usize {
    50
}

fn default_input_fields() -> String {
    "input".to_string()
}
