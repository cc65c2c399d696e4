//! Catalog API response models and the track/playlist types the exporter works on

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope wrapping every catalog API response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(default)]
    pub response: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Best-effort human readable error carried in a failed response
    pub fn error_message(&self) -> String {
        match &self.response {
            Value::String(message) => message.clone(),
            Value::Null => format!("status {}", self.status_code),
            other => other.to_string(),
        }
    }
}

/// Owner of a playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(rename = "userID", default)]
    pub user_id: Option<String>,
    pub username: String,
}

/// Playlist metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(rename = "collectionID")]
    pub collection_id: String,
    pub name: String,
    pub owner: Owner,
}

// Playlist with tracks response (GET /v1/playlists/<id>); only the track list is used
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistWithTracks {
    #[serde(default, rename = "trackList")]
    pub track_list: Vec<TrackEntry>,
}

/// Track as listed by the catalog, before URLs are attached
#[derive(Debug, Clone, Deserialize)]
pub struct TrackEntry {
    #[serde(rename = "trackID")]
    pub track_id: String,
    #[serde(default)]
    pub metadata: Option<TrackMetadata>,
}

/// Title and artists of a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: String,
    #[serde(default)]
    pub artists: Vec<String>,
}

/// A playable track with its (possibly not yet loaded) metadata
#[derive(Debug, Clone)]
pub struct Track {
    pub track_id: String,
    pub metadata: Option<TrackMetadata>,
    pub audio_url: String,
    pub thumbnail_url: Option<String>,
}

impl Track {
    pub fn new(track_id: impl Into<String>, audio_url: impl Into<String>) -> Self {
        Self {
            track_id: track_id.into(),
            metadata: None,
            audio_url: audio_url.into(),
            thumbnail_url: None,
        }
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    pub fn with_metadata(mut self, metadata: TrackMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
