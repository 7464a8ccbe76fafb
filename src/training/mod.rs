//! Training data preparation and checkpoint discovery

pub mod checkpoint;
pub mod data_loader;

pub use checkpoint::{
    ensure_not_overwriting, find_loadable, latest_checkpoint, resolve_adapter, AdapterSource,
    CheckpointInfo,
};
pub use data_loader::{DataProcessor, Record, Shuffle, TrainingDataset};
