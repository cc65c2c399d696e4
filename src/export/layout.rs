//! Deterministic output paths

use std::path::{Path, PathBuf};

use super::TargetFormat;
use crate::catalog::{Playlist, Track};
use crate::utils::{sanitize_filename, truncate_name, MAX_NAME_BYTES};

/// Maps playlists and tracks onto `<root>/<owner>/<playlistID> - <name>/<trackID>.<ext>`
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
    format: TargetFormat,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>, format: TargetFormat) -> Self {
        Self {
            root: root.into(),
            format,
        }
    }

    /// Directory holding one playlist's tracks
    ///
    /// The composed `<id> - <name>` component is what gets length-limited, so a
    /// long name is shortened from its end and the id prefix survives.
    pub fn playlist_dir(&self, playlist: &Playlist) -> PathBuf {
        let component = format!(
            "{} - {}",
            sanitize_filename(&playlist.collection_id),
            sanitize_filename(&playlist.name)
        );
        self.root
            .join(sanitize_filename(&playlist.owner.username))
            .join(sanitize_filename(&component))
    }

    /// Destination of a track inside its playlist directory
    pub fn track_path(&self, playlist_dir: &Path, track: &Track) -> PathBuf {
        let extension = self.format.extension();
        let stem = sanitize_filename(&track.track_id);
        let stem = truncate_name(&stem, MAX_NAME_BYTES - extension.len() - 1);
        playlist_dir.join(format!("{}.{}", stem, extension))
    }
}
