//! Prompt construction and the model backend interface

pub mod backend;
pub mod template_engine;

pub use backend::{
    cosine_similarity, strip_eos, FragmentStream, ModelBackend, ParameterInfo, SamplingParams,
    TrainingRow,
};
pub use template_engine::{Template, TemplateEngine};
