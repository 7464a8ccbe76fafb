//! Command-line interface module.
//!
//! Commands inspect settings, render prompts and prepare training data
//! without loading a model.

pub mod commands;
pub mod handlers;

pub use handlers::{handle_checkpoint, handle_prepare, handle_prompt, handle_settings};
