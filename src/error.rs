//! Error types for tunekit.

use std::path::PathBuf;
use thiserror::Error;

/// A specialized Result type for tunekit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed or missing configuration, including template documents.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid settings document: {0}")]
    Invalid(String),

    #[error("\"bits\" must be 4, 8 or 16, got {0}")]
    InvalidBits(u8),

    #[error("duplicate template field-key '{0}'")]
    DuplicateFieldKey(String),

    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

/// Failure to turn a set of fields into a prompt.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    #[error("no template for field-key '{0}'")]
    UnknownFieldKey(String),

    #[error("template references placeholder '{{{0}}}' which was not supplied")]
    MissingPlaceholder(String),

    #[error("without templates exactly one field plus 'output' is accepted, got '{0}'")]
    FieldCount(String),
}

/// Unified error type for tunekit.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Data error in record {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: TemplateError,
    },

    #[error("Data error: {0}")]
    Data(String),

    #[error("Fine-tuning has already finished in {0}; remove the previous result to redo it")]
    AlreadyTrained(PathBuf),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a backend error
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Error::Backend(msg.into())
    }

    /// Create a data error
    pub fn data<S: Into<String>>(msg: S) -> Self {
        Error::Data(msg.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    pub fn is_template(&self) -> bool {
        matches!(self, Error::Template(_) | Error::Record { .. })
    }
}
