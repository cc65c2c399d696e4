//! Catalog API HTTP client

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::auth::{bearer, AuthRequest, AuthToken};
use super::models::*;
use super::Catalog;
use crate::error::{ExportError, Result};

/// HTTP client for the catalog REST API
#[derive(Clone)]
pub struct CatalogClient {
    base_url: Url,
    token: Option<String>,
    http_client: Client,
}

impl CatalogClient {
    /// Create a new, unauthenticated catalog client
    pub fn new(server: &str) -> Result<Self> {
        let mut server = server.trim().to_string();
        if !server.ends_with('/') {
            server.push('/');
        }
        let base_url = Url::parse(&server)
            .map_err(|e| ExportError::Catalog(format!("invalid server address {}: {}", server, e)))?;

        let http_client = Client::builder()
            .user_agent(concat!("pb-export/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExportError::Catalog(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            token: None,
            http_client,
        })
    }

    /// Exchange the private key for a session token
    pub async fn authenticate(&mut self, private_key: &str) -> Result<()> {
        let url = self.endpoint("v1/authenticate")?;
        debug!("Authenticating against {}", url);

        let response: ApiResponse = self
            .http_client
            .post(url)
            .json(&AuthRequest::with_key(private_key))
            .send()
            .await
            .map_err(|e| ExportError::Catalog(format!("failed to authenticate: {}", e)))?
            .json()
            .await
            .map_err(|e| ExportError::Catalog(format!("failed to parse auth response: {}", e)))?;

        let token: AuthToken = Self::unwrap_response(response, "authenticate")?;
        self.token = Some(token.jwt);
        Ok(())
    }

    /// Build an absolute URL for an API path relative to the server root
    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ExportError::Catalog(format!("invalid endpoint {}: {}", path, e)))
    }

    /// Direct URL of a track's audio stream
    pub fn audio_url(&self, track_id: &str) -> String {
        format!(
            "{}v1/audio/{}",
            self.base_url,
            urlencoding::encode(track_id)
        )
    }

    /// Direct URL of a track's thumbnail image
    pub fn thumbnail_url(&self, track_id: &str) -> String {
        format!("{}/thumbnail", self.audio_url(track_id))
    }

    /// GET an authenticated endpoint and decode its payload
    async fn get<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!("Fetching {} from: {}", what, url);

        let mut request = self.http_client.get(url);
        if let Some(token) = &self.token {
            request = request.header(reqwest::header::AUTHORIZATION, bearer(token));
        }

        let response: ApiResponse = request
            .send()
            .await
            .map_err(|e| ExportError::Catalog(format!("failed to fetch {}: {}", what, e)))?
            .json()
            .await
            .map_err(|e| ExportError::Catalog(format!("failed to parse {} response: {}", what, e)))?;

        Self::unwrap_response(response, what)
    }

    /// Check the envelope status and decode the payload
    fn unwrap_response<T: DeserializeOwned>(response: ApiResponse, what: &str) -> Result<T> {
        if !response.is_success() {
            return Err(ExportError::Catalog(format!(
                "{} failed: {}",
                what,
                response.error_message()
            )));
        }
        serde_json::from_value(response.response)
            .map_err(|e| ExportError::Catalog(format!("unexpected {} payload: {}", what, e)))
    }

    fn to_track(&self, entry: TrackEntry) -> Track {
        let track = Track::new(&entry.track_id, self.audio_url(&entry.track_id))
            .with_thumbnail(self.thumbnail_url(&entry.track_id));
        match entry.metadata {
            Some(metadata) => track.with_metadata(metadata),
            None => track,
        }
    }
}

#[async_trait]
impl Catalog for CatalogClient {
    async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        let playlists: Vec<Playlist> = self.get("v1/playlists", "playlists").await?;
        debug!("Found {} playlists", playlists.len());
        Ok(playlists)
    }

    async fn track_list(&self, playlist: &Playlist) -> Result<Vec<Track>> {
        let path = format!(
            "v1/playlists/{}",
            urlencoding::encode(&playlist.collection_id)
        );
        let details: PlaylistWithTracks = self.get(&path, "playlist").await?;

        Ok(details
            .track_list
            .into_iter()
            .map(|entry| self.to_track(entry))
            .collect())
    }

    async fn load_metadata(&self, track: &Track) -> Result<TrackMetadata> {
        let path = format!("v1/tracks/{}", urlencoding::encode(&track.track_id));
        let entry: TrackEntry =
            self.get(&path, "track")
                .await
                .map_err(|e| ExportError::MetadataLoad {
                    track_id: track.track_id.clone(),
                    message: e.to_string(),
                })?;

        entry.metadata.ok_or_else(|| ExportError::MetadataLoad {
            track_id: track.track_id.clone(),
            message: "track has no metadata".to_string(),
        })
    }
}
