//! Export of a single playlist

use indicatif::ProgressBar;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

use super::layout::OutputLayout;
use super::pipeline::{DownloadJob, TrackPipeline};
use super::pool::{PoolReport, WorkerPool};
use crate::catalog::{Catalog, Playlist};
use crate::error::{ExportError, Result};

/// Outcome of one playlist
#[derive(Debug, Clone)]
pub struct PlaylistReport {
    pub name: String,
    pub dir: PathBuf,
    pub tracks: PoolReport,
}

/// Prepares a playlist's directory and drains its tracks through a worker pool
pub struct PlaylistJob<'a> {
    playlist: &'a Playlist,
    layout: &'a OutputLayout,
    pipeline: Arc<TrackPipeline>,
    workers: usize,
}

impl<'a> PlaylistJob<'a> {
    pub fn new(
        playlist: &'a Playlist,
        layout: &'a OutputLayout,
        pipeline: Arc<TrackPipeline>,
        workers: usize,
    ) -> Self {
        Self {
            playlist,
            layout,
            pipeline,
            workers,
        }
    }

    /// Attempt every track; only directory or track list failures are errors
    pub async fn run(&self, catalog: &dyn Catalog, progress: ProgressBar) -> Result<PlaylistReport> {
        let name = &self.playlist.name;
        let dir = self.layout.playlist_dir(self.playlist);

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ExportError::io(&dir, e))?;
        debug!("Created playlist folder: {}", dir.display());

        let tracks = catalog.track_list(self.playlist).await?;
        info!("Downloading playlist \"{}\" ({} tracks)", name, tracks.len());

        // A track listed twice maps to one destination and is exported once
        let mut seen = HashSet::new();
        let jobs: Vec<DownloadJob> = tracks
            .into_iter()
            .filter_map(|track| {
                let dest = self.layout.track_path(&dir, &track);
                if seen.insert(dest.clone()) {
                    Some(DownloadJob { track, dest })
                } else {
                    debug!("Duplicate entry for track {} in \"{}\"", track.track_id, name);
                    None
                }
            })
            .collect();

        progress.set_length(jobs.len() as u64);
        progress.set_message(name.clone());

        let pipeline = self.pipeline.clone();
        let report = WorkerPool::new(self.workers)
            .with_progress(progress.clone())
            .run(jobs, move |job| {
                let pipeline = pipeline.clone();
                async move { pipeline.run(job).await }
            })
            .await;

        progress.finish_with_message(format!("{} ({}/{})", name, report.attempted(), report.total));
        info!("Finished downloading playlist \"{}\"", name);

        Ok(PlaylistReport {
            name: name.clone(),
            dir,
            tracks: report,
        })
    }
}
