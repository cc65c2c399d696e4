//! Error taxonomy for the export pipeline

use std::path::PathBuf;

use thiserror::Error;

/// Every way a track, a playlist or the catalog can fail during an export
#[derive(Debug, Error)]
pub enum ExportError {
    /// Network fetch failed or the server answered with a non-2xx status
    #[error("transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    /// Declared content type is not one of the known audio types
    #[error("mime type \"{0}\" not supported")]
    UnsupportedFormat(String),

    /// Track metadata could not be loaded from the catalog
    #[error("failed to load metadata for track {track_id}: {message}")]
    MetadataLoad { track_id: String, message: String },

    /// Local filesystem read or write failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external converter could not be spawned or exited non-zero
    #[error("converter failed: {0}")]
    ExternalTool(String),

    /// Tags could not be written to the finished audio file
    #[error("failed to write tags to {}: {message}", path.display())]
    TagWrite { path: PathBuf, message: String },

    /// Playlist or track list retrieval, or authentication, failed
    #[error("catalog error: {0}")]
    Catalog(String),

    /// The run was configured in a way that would damage existing files
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn transport(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Short machine-friendly name of the failure cause, used in summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::UnsupportedFormat(_) => "unsupported-format",
            Self::MetadataLoad { .. } => "metadata",
            Self::Io { .. } => "io",
            Self::ExternalTool(_) => "converter",
            Self::TagWrite { .. } => "tag-write",
            Self::Catalog(_) => "catalog",
            Self::Config(_) => "config",
        }
    }
}

pub type Result<T, E = ExportError> = std::result::Result<T, E>;
