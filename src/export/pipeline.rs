//! Per-track export: fetch, transcode, tag
//!
//! Each track goes through a strict, non-retrying sequence:
//! skip check, metadata load, audio fetch, classification, temp write,
//! thumbnail fetch (best-effort), transcode, tag. The first hard failure ends
//! the track. The converter writes to a staging file owned by the run, which is
//! renamed onto the destination only once conversion succeeded, so a failed
//! transcode never touches the destination.

use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

use super::fetcher::{audio_extension, MediaFetcher};
use super::pool::PoolItem;
use super::scratch::ScratchDir;
use super::tagger::{MetadataTagger, TrackTags};
use super::transcoder::Transcoder;
use crate::catalog::{Catalog, Track, TrackMetadata};
use crate::error::{ExportError, Result};
use crate::utils::{truncate_name, MAX_NAME_BYTES};

static NEXT_STAGING_ID: AtomicU64 = AtomicU64::new(0);

/// Hidden sibling of `dest` that only one pipeline run writes to
///
/// Keeps the destination's extension so the converter still infers the format.
fn staging_path(dest: &Path) -> PathBuf {
    let id = NEXT_STAGING_ID.fetch_add(1, Ordering::Relaxed);
    let stem = dest
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = match dest.extension() {
        Some(ext) => format!(".{}.part.{}", id, ext.to_string_lossy()),
        None => format!(".{}.part", id),
    };
    let stem = truncate_name(&stem, MAX_NAME_BYTES.saturating_sub(suffix.len() + 1));
    dest.with_file_name(format!(".{}{}", stem, suffix))
}

/// Remove a file, treating "already gone" as success
async fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ExportError::io(path, e)),
    }
}

/// How a track that did not fail was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    /// Fetched, transcoded and tagged
    Exported,
    /// Destination already existed
    Skipped,
}

/// A dequeued track and where it should end up
#[derive(Debug)]
pub struct DownloadJob {
    pub track: Track,
    pub dest: PathBuf,
}

impl PoolItem for DownloadJob {
    fn label(&self) -> &str {
        &self.track.track_id
    }
}

/// The collaborators a pipeline drives
#[derive(Clone)]
pub struct PipelineServices {
    pub catalog: Arc<dyn Catalog>,
    pub fetcher: Arc<dyn MediaFetcher>,
    pub transcoder: Arc<dyn Transcoder>,
    pub tagger: Arc<dyn MetadataTagger>,
}

/// Runs the per-track procedure against one scratch directory
#[derive(Clone)]
pub struct TrackPipeline {
    services: PipelineServices,
    scratch: ScratchDir,
}

impl TrackPipeline {
    pub fn new(services: PipelineServices, scratch: ScratchDir) -> Self {
        Self { services, scratch }
    }

    /// Produce a finished, tagged file at `job.dest`
    pub async fn run(&self, job: DownloadJob) -> Result<TrackOutcome> {
        let DownloadJob { mut track, dest } = job;

        if fs::try_exists(&dest)
            .await
            .map_err(|e| ExportError::io(&dest, e))?
        {
            debug!("Already exported: {}", dest.display());
            return Ok(TrackOutcome::Skipped);
        }

        let metadata = self.ensure_metadata(&mut track).await?;

        let audio = self.services.fetcher.fetch(&track.audio_url).await?;
        let extension = audio_extension(audio.content_type.as_deref())?;

        let temp_path = self.scratch.temp_file(&track.track_id, extension);
        fs::write(&temp_path, &audio.data)
            .await
            .map_err(|e| ExportError::io(&temp_path, e))?;
        drop(audio);

        // A crashed earlier run may have left a staging file with the same name
        let staged = staging_path(&dest);
        remove_if_present(&staged).await?;

        let (cover, transcoded) = tokio::join!(
            self.fetch_cover(&track),
            self.services.transcoder.transcode(&temp_path, &staged)
        );

        if let Err(e) = transcoded {
            // Only the staging file is ours to clean up
            if let Err(cleanup) = remove_if_present(&staged).await {
                debug!("Could not remove {}: {}", staged.display(), cleanup);
            }
            return Err(e);
        }

        if let Err(e) = fs::rename(&staged, &dest).await {
            let _ = remove_if_present(&staged).await;
            return Err(ExportError::io(&dest, e));
        }

        self.services
            .tagger
            .tag(
                &dest,
                TrackTags {
                    title: metadata.title,
                    artists: metadata.artists,
                    cover,
                },
            )
            .await?;

        debug!("Exported {} -> {}", track.track_id, dest.display());
        Ok(TrackOutcome::Exported)
    }

    async fn ensure_metadata(&self, track: &mut Track) -> Result<TrackMetadata> {
        if let Some(metadata) = &track.metadata {
            return Ok(metadata.clone());
        }

        let metadata = self
            .services
            .catalog
            .load_metadata(track)
            .await
            .map_err(|e| match e {
                ExportError::MetadataLoad { .. } => e,
                other => ExportError::MetadataLoad {
                    track_id: track.track_id.clone(),
                    message: other.to_string(),
                },
            })?;
        track.metadata = Some(metadata.clone());
        Ok(metadata)
    }

    /// Thumbnail bytes, or None on any failure
    async fn fetch_cover(&self, track: &Track) -> Option<Bytes> {
        let url = track.thumbnail_url.as_deref()?;
        match self.services.fetcher.fetch(url).await {
            Ok(media) => Some(media.data),
            Err(e) => {
                debug!("No cover for {}: {}", track.track_id, e);
                None
            }
        }
    }
}
