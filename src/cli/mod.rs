//! CLI module for pb-export

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::export::TargetFormat;

pub mod commands;

#[derive(Parser, Debug)]
#[command(name = "pb-export", about = "Export PipeBomb playlists to tagged audio files")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download every playlist of the account
    Export(ExportArgs),

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Catalog server URL
    #[arg(long, env = "PB_SERVER")]
    pub server: String,

    /// Account private key
    #[arg(long, env = "PB_KEY", hide_env_values = true)]
    pub key: String,

    /// Output directory
    #[arg(short, long, default_value = "download")]
    pub output: PathBuf,

    /// Scratch directory for raw downloads (wiped at start and end)
    #[arg(long, default_value = "tmp")]
    pub scratch: PathBuf,

    /// Target audio format
    #[arg(short, long, value_enum, default_value_t = TargetFormat::Mp3)]
    pub format: TargetFormat,

    /// Number of tracks downloaded in parallel per playlist
    #[arg(short, long, default_value = "15")]
    pub workers: usize,

    /// Path to ffmpeg (searched on PATH if omitted)
    #[arg(long, env = "FFMPEG_PATH")]
    pub ffmpeg: Option<PathBuf>,

    /// Hide progress bars
    #[arg(long)]
    pub no_progress: bool,
}
