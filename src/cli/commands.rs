//! CLI command handlers

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::generate;
use colored::Colorize;
use std::io;
use std::sync::Arc;
use tracing::info;

use super::{Cli, ExportArgs};
use crate::catalog::CatalogClient;
use crate::export::{
    locate_ffmpeg, ExportConfig, ExportEngine, ExportSummary, FfmpegTranscoder, HttpFetcher,
    LoftyTagger, PipelineServices,
};

/// Handle the `export` command
pub async fn export(args: ExportArgs) -> Result<()> {
    let ffmpeg = locate_ffmpeg(args.ffmpeg.as_deref())?;
    info!("Using ffmpeg at {}", ffmpeg.display());

    println!("{}", "Authenticating...".cyan());
    let mut client = CatalogClient::new(&args.server)?;
    client
        .authenticate(&args.key)
        .await
        .context("Failed to authenticate with the catalog server")?;

    let services = PipelineServices {
        catalog: Arc::new(client),
        fetcher: Arc::new(HttpFetcher::new()?),
        transcoder: Arc::new(FfmpegTranscoder::new(ffmpeg)),
        tagger: Arc::new(LoftyTagger),
    };

    let config = ExportConfig {
        output_dir: args.output,
        scratch_dir: args.scratch,
        format: args.format,
        workers: args.workers,
        show_progress: !args.no_progress,
    };

    let summary = ExportEngine::new(services, config).run().await?;
    print_summary(&summary);

    Ok(())
}

fn print_summary(summary: &ExportSummary) {
    println!();
    println!("{}", "Finished!".green().bold());
    println!(
        "  Playlists: {}/{}",
        summary.playlists_completed, summary.playlists_total
    );
    println!("  Tracks exported: {}", summary.tracks_exported);
    println!("  Tracks already present: {}", summary.tracks_skipped);

    if !summary.tracks_failed.is_empty() {
        println!(
            "  {}",
            format!("Tracks failed: {}", summary.tracks_failed.len()).yellow()
        );
        for (playlist, failure) in &summary.tracks_failed {
            println!("    - {} / {}: {}", playlist, failure.label, failure.reason);
        }
    }

    for (playlist, reason) in &summary.playlists_failed {
        println!("  {} {}: {}", "Playlist failed:".red(), playlist, reason);
    }
}

/// Handle the `completion` command
pub fn completion(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "pb-export", &mut io::stdout());
}
