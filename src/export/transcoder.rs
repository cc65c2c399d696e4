//! External audio converter invocation

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{ExportError, Result};

/// Converts a source audio file into the format implied by the destination extension
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, source: &Path, dest: &Path) -> Result<()>;
}

/// Locate the ffmpeg binary
///
/// An explicit path must point at an existing file; otherwise `ffmpeg` is
/// looked up on `PATH`.
pub fn locate_ffmpeg(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(path) => anyhow::bail!("ffmpeg not found at {}", path.display()),
        None => which::which("ffmpeg").map_err(|_| {
            anyhow::anyhow!(
                "Failed to locate ffmpeg. Install it or pass --ffmpeg / set FFMPEG_PATH."
            )
        }),
    }
}

/// Transcoder running `ffmpeg -i <source> <dest>`
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    ffmpeg_path: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: PathBuf) -> Self {
        Self { ffmpeg_path }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, source: &Path, dest: &Path) -> Result<()> {
        debug!("Transcoding {} -> {}", source.display(), dest.display());

        // TODO: wrap in tokio::time::timeout; a hung ffmpeg holds its worker slot forever
        let output = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(source)
            .arg(dest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                ExportError::ExternalTool(format!(
                    "failed to spawn {}: {}",
                    self.ffmpeg_path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if let Some(last) = stderr.lines().rev().find(|l| !l.trim().is_empty()) {
                debug!("ffmpeg: {}", last.trim());
            }
            return Err(ExportError::ExternalTool(format!(
                "ffmpeg exited with {} for {}",
                output.status,
                source.display()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_missing_path_fails() {
        let err = locate_ffmpeg(Some(Path::new("/definitely/not/ffmpeg"))).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/ffmpeg"));
    }

    #[test]
    fn test_explicit_existing_path_is_used() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let found = locate_ffmpeg(Some(file.path())).unwrap();
        assert_eq!(found, file.path());
    }

    #[tokio::test]
    async fn test_spawn_failure_is_external_tool_error() {
        let transcoder = FfmpegTranscoder::new(PathBuf::from("/definitely/not/ffmpeg"));
        let err = transcoder
            .transcode(Path::new("in.webm"), Path::new("out.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::ExternalTool(_)));
    }
}
