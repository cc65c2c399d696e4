//! Run-scoped scratch directory for raw downloads

use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::{ExportError, Result};
use crate::utils::sanitize_filename;

/// Handle to the directory holding raw audio between fetch and transcode
///
/// Temp files are never removed one by one; the whole directory is cleared when
/// a run starts and removed when it ends.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Clear anything left by a previous run and create the directory afresh
    pub async fn prepare(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        match fs::remove_dir_all(&path).await {
            Ok(()) => debug!("Removed stale scratch directory {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ExportError::io(&path, e)),
        }

        fs::create_dir_all(&path)
            .await
            .map_err(|e| ExportError::io(&path, e))?;

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the raw download of a track is kept
    pub fn temp_file(&self, track_id: &str, extension: &str) -> PathBuf {
        self.path
            .join(format!("{}.{}", sanitize_filename(track_id), extension))
    }

    /// Remove the directory and everything in it
    pub async fn remove(self) -> Result<()> {
        match fs::remove_dir_all(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ExportError::io(&self.path, e)),
        }
    }
}

/// Refuse a scratch location that is, contains, or sits inside the output tree
///
/// The scratch directory is wiped at both ends of a run, so any overlap would
/// delete exported files.
pub fn ensure_outside(scratch: &Path, output: &Path) -> Result<()> {
    let scratch_abs = resolve(scratch).map_err(|e| ExportError::io(scratch, e))?;
    let output_abs = resolve(output).map_err(|e| ExportError::io(output, e))?;

    if scratch_abs.starts_with(&output_abs) || output_abs.starts_with(&scratch_abs) {
        return Err(ExportError::Config(format!(
            "scratch directory {} overlaps output directory {}",
            scratch.display(),
            output.display()
        )));
    }
    Ok(())
}

/// Absolute, `..`-free form of a path with symlinks resolved where it exists
fn resolve(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut lexical = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                lexical.pop();
            }
            other => lexical.push(other),
        }
    }

    let mut existing = lexical.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            let mut resolved = canonical;
            resolved.extend(missing.iter().rev());
            return Ok(resolved);
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => return Ok(lexical.clone()),
        }
    }
}
