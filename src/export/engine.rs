//! Export orchestration across all playlists

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::layout::OutputLayout;
use super::pipeline::{PipelineServices, TrackPipeline};
use super::playlist::{PlaylistJob, PlaylistReport};
use super::pool::PoolFailure;
use super::scratch::{self, ScratchDir};
use super::ExportConfig;
use crate::error::Result;

/// Totals of a whole run
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub playlists_total: usize,
    pub playlists_completed: usize,
    /// Playlists that could not be processed, with the reason
    pub playlists_failed: Vec<(String, String)>,
    pub tracks_exported: usize,
    pub tracks_skipped: usize,
    /// Failed tracks, by playlist name
    pub tracks_failed: Vec<(String, PoolFailure)>,
}

impl ExportSummary {
    fn add(&mut self, report: PlaylistReport) {
        self.playlists_completed += 1;
        self.tracks_exported += report.tracks.exported;
        self.tracks_skipped += report.tracks.skipped;
        self.tracks_failed.extend(
            report
                .tracks
                .failures
                .into_iter()
                .map(|failure| (report.name.clone(), failure)),
        );
    }
}

/// Runs every playlist in turn, one scratch directory per run
pub struct ExportEngine {
    services: PipelineServices,
    config: ExportConfig,
}

impl ExportEngine {
    pub fn new(services: PipelineServices, config: ExportConfig) -> Self {
        Self { services, config }
    }

    /// Export all playlists
    ///
    /// Playlist failures are logged and skipped. Errors are returned only when the
    /// scratch directory overlaps the output tree or cannot be set up, or when the
    /// playlists cannot be listed.
    pub async fn run(&self) -> Result<ExportSummary> {
        scratch::ensure_outside(&self.config.scratch_dir, &self.config.output_dir)?;
        let scratch = ScratchDir::prepare(&self.config.scratch_dir).await?;

        let result = self.export_all(&scratch).await;

        info!("Cleaning up...");
        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.remove().await {
            warn!("Failed to remove scratch directory {}: {}", scratch_path.display(), e);
        }

        result
    }

    async fn export_all(&self, scratch: &ScratchDir) -> Result<ExportSummary> {
        info!("Locating playlists...");
        let playlists = self.services.catalog.list_playlists().await?;
        info!("Located {} playlists.", playlists.len());

        let pipeline = Arc::new(TrackPipeline::new(self.services.clone(), scratch.clone()));
        let layout = OutputLayout::new(&self.config.output_dir, self.config.format);
        let multi = if self.config.show_progress {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        let mut summary = ExportSummary {
            playlists_total: playlists.len(),
            ..ExportSummary::default()
        };

        for playlist in &playlists {
            let progress = multi.add(ProgressBar::new(0));
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            {
                progress.set_style(style.progress_chars("#>-"));
            }

            let job = PlaylistJob::new(playlist, &layout, pipeline.clone(), self.config.workers);
            match job.run(self.services.catalog.as_ref(), progress.clone()).await {
                Ok(report) => summary.add(report),
                Err(e) => {
                    progress.abandon_with_message(format!("Failed: {} - {}", playlist.name, e));
                    error!("Failed to download playlist \"{}\": {}", playlist.name, e);
                    summary
                        .playlists_failed
                        .push((playlist.name.clone(), e.to_string()));
                }
            }
        }

        Ok(summary)
    }
}
