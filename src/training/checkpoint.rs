//! Adapter checkpoint discovery
//!
//! The backend writes intermediate checkpoints as subdirectories of the
//! training output path and the finished adapter as weight files directly in
//! it. These helpers decide what to load and whether a run may start.

use crate::config::Settings;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

/// Weight files whose presence marks a finished adapter.
pub const FINAL_WEIGHT_FILES: [&str; 3] = [
    "adapter_model.bin",
    "adapter_model.safetensors",
    "model.bin",
];

/// Information about a checkpoint directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointInfo {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Where the adapter weights come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterSource {
    /// Finished adapter
    Finalized(PathBuf),
    /// Intermediate training checkpoint
    Checkpoint(PathBuf),
    /// Nothing on disk; a fresh adapter is created
    Fresh,
}

impl AdapterSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            AdapterSource::Finalized(path) | AdapterSource::Checkpoint(path) => Some(path),
            AdapterSource::Fresh => None,
        }
    }
}

pub fn is_finalized(path: &Path) -> bool {
    FINAL_WEIGHT_FILES
        .iter()
        .any(|name| path.join(name).is_file())
}

/// Checkpoint subdirectories of `path`, oldest first. A missing directory has
/// no checkpoints.
pub fn list_checkpoints(path: &Path) -> Result<Vec<CheckpointInfo>> {
    if !path.is_dir() {
        return Ok(Vec::new());
    }

    let mut checkpoints = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if metadata.is_dir() {
            checkpoints.push(CheckpointInfo {
                path: entry.path(),
                modified: metadata.modified()?,
            });
        }
    }

    checkpoints.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)));
    Ok(checkpoints)
}

/// Most recently modified checkpoint under `path`.
pub fn latest_checkpoint(path: &Path) -> Result<Option<PathBuf>> {
    Ok(list_checkpoints(path)?.pop().map(|info| info.path))
}

/// The directory itself when finished, else its latest checkpoint.
pub fn find_loadable(path: &Path) -> Result<AdapterSource> {
    if is_finalized(path) {
        return Ok(AdapterSource::Finalized(path.to_path_buf()));
    }
    Ok(latest_checkpoint(path)?
        .map(AdapterSource::Checkpoint)
        .unwrap_or(AdapterSource::Fresh))
}

/// Pick the adapter to load. Output of a previous training run wins over the
/// configured adapter path.
pub fn resolve_adapter(settings: &Settings) -> Result<AdapterSource> {
    let from_output = find_loadable(&settings.training.output_path)?;
    let source = match from_output {
        AdapterSource::Fresh => find_loadable(&settings.adapter.path)?,
        found => found,
    };

    match source.path() {
        Some(path) => info!("Loading adapter from: {}", path.display()),
        None => debug!("No adapter on disk, starting fresh"),
    }
    Ok(source)
}

/// Refuse to train into an output that already holds a finished adapter.
pub fn ensure_not_overwriting(output_path: &Path) -> Result<()> {
    if is_finalized(output_path) {
        return Err(Error::AlreadyTrained(output_path.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettingsFormat;
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::TempDir;

    fn settings_in(dir: &Path) -> Settings {
        let doc = format!(
            r#"{{ "base": {{ "path": "model" }},
                 "adapter": {{ "path": "{}" }},
                 "training": {{ "outputPath": "{}" }} }}"#,
            dir.join("adapter").display(),
            dir.join("output").display()
        );
        Settings::parse(&doc, SettingsFormat::Json, Path::new("unused")).unwrap()
    }

    #[test]
    fn test_missing_directory_is_fresh() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(list_checkpoints(&missing).unwrap().is_empty());
        assert_eq!(find_loadable(&missing).unwrap(), AdapterSource::Fresh);
        assert!(ensure_not_overwriting(&missing).is_ok());
    }

    #[test]
    fn test_latest_checkpoint_by_mtime() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("checkpoint-200")).unwrap();
        sleep(Duration::from_millis(20));
        fs::create_dir(dir.path().join("checkpoint-100")).unwrap();
        fs::write(dir.path().join("trainer.log"), "x").unwrap();

        assert_eq!(list_checkpoints(dir.path()).unwrap().len(), 2);
        assert_eq!(
            latest_checkpoint(dir.path()).unwrap(),
            Some(dir.path().join("checkpoint-100"))
        );
    }

    #[test]
    fn test_finalized_wins_over_checkpoints() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("checkpoint-1")).unwrap();
        fs::write(dir.path().join("adapter_model.safetensors"), b"w").unwrap();

        assert!(is_finalized(dir.path()));
        assert_eq!(
            find_loadable(dir.path()).unwrap(),
            AdapterSource::Finalized(dir.path().to_path_buf())
        );
        assert!(matches!(
            ensure_not_overwriting(dir.path()),
            Err(Error::AlreadyTrained(_))
        ));
    }

    #[test]
    fn test_output_path_wins_over_adapter_path() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(dir.path());

        assert_eq!(resolve_adapter(&settings).unwrap(), AdapterSource::Fresh);

        fs::create_dir_all(dir.path().join("adapter")).unwrap();
        fs::write(dir.path().join("adapter/adapter_model.bin"), b"w").unwrap();
        assert_eq!(
            resolve_adapter(&settings).unwrap(),
            AdapterSource::Finalized(dir.path().join("adapter"))
        );

        fs::create_dir_all(dir.path().join("output/checkpoint-10")).unwrap();
        assert_eq!(
            resolve_adapter(&settings).unwrap(),
            AdapterSource::Checkpoint(dir.path().join("output/checkpoint-10"))
        );
    }
}
