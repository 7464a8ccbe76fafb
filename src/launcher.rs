//! Runs a routine from the directory holding its settings file.
//!
//! Relative paths inside a settings document are written relative to that
//! document, so the working directory is switched to its parent for the
//! duration of the call and restored afterwards, including when the routine
//! fails or panics.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

struct RestoreDir(PathBuf);

impl Drop for RestoreDir {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.0) {
            warn!("Failed to restore working directory {}: {}", self.0.display(), e);
        }
    }
}

/// Call `f` with the settings file name while the working directory is the
/// file's parent.
pub fn launch<P, F, R>(settings_path: P, f: F) -> io::Result<R>
where
    P: AsRef<Path>,
    F: FnOnce(&Path) -> R,
{
    let settings_path = settings_path.as_ref();
    let file_name = settings_path.file_name().map(Path::new).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not a settings file path: {}", settings_path.display()),
        )
    })?;

    let _restore = match settings_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            let original = env::current_dir()?;
            env::set_current_dir(dir)?;
            debug!("Working directory switched to {}", dir.display());
            Some(RestoreDir(original))
        }
        _ => None,
    };

    Ok(f(file_name))
}
