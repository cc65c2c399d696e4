//! Export engine module

pub mod engine;
pub mod fetcher;
pub mod layout;
pub mod pipeline;
pub mod playlist;
pub mod pool;
pub mod scratch;
pub mod tagger;
pub mod transcoder;

#[cfg(test)]
pub(crate) mod testing;

use std::path::PathBuf;

pub use engine::{ExportEngine, ExportSummary};
pub use fetcher::HttpFetcher;
pub use pipeline::PipelineServices;
pub use tagger::LoftyTagger;
pub use transcoder::{locate_ffmpeg, FfmpegTranscoder};

/// Audio format exported files are converted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TargetFormat {
    Mp3,
    Flac,
    Ogg,
    Opus,
    M4a,
}

impl TargetFormat {
    /// File extension; the converter picks the codec from it
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Flac => "flac",
            Self::Ogg => "ogg",
            Self::Opus => "opus",
            Self::M4a => "m4a",
        }
    }
}

/// Configuration for an export run
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Root of the permanent output tree
    pub output_dir: PathBuf,
    /// Run-scoped scratch directory, wiped at start and end
    pub scratch_dir: PathBuf,
    /// Format every track is converted to
    pub format: TargetFormat,
    /// Concurrent tracks per playlist
    pub workers: usize,
    /// Draw progress bars
    pub show_progress: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("download"),
            scratch_dir: PathBuf::from("tmp"),
            format: TargetFormat::Mp3,
            workers: pool::DEFAULT_WORKERS,
            show_progress: true,
        }
    }
}
