//! Remote catalog module

pub mod auth;
pub mod client;
pub mod models;

use async_trait::async_trait;

pub use client::CatalogClient;
pub use models::*;

use crate::error::Result;

/// Read-only view of the remote music catalog the exporter consumes
#[async_trait]
pub trait Catalog: Send + Sync {
    /// All playlists visible to the authenticated user
    async fn list_playlists(&self) -> Result<Vec<Playlist>>;

    /// Tracks of a playlist, in playlist order
    async fn track_list(&self, playlist: &Playlist) -> Result<Vec<Track>>;

    /// Load title and artists for a track whose metadata was not listed
    async fn load_metadata(&self, track: &Track) -> Result<TrackMetadata>;
}
