//! Settings resolution, prompt templating and orchestration glue for
//! fine-tuning and serving adapter-augmented causal language models.

pub mod cli;
pub mod config;
pub mod error;
pub mod launcher;
pub mod orchestration;
pub mod runtime;
pub mod training;

// Re-export commonly used types
pub use config::Settings;
pub use error::{ConfigError, Error, Result, TemplateError};
pub use runtime::{ModelBackend, TemplateEngine};
