//! In-memory fakes of the pipeline collaborators

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use super::fetcher::{FetchedMedia, MediaFetcher};
use super::pipeline::{PipelineServices, TrackPipeline};
use super::scratch::ScratchDir;
use super::tagger::{MetadataTagger, TrackTags};
use super::transcoder::Transcoder;
use crate::catalog::{Catalog, Owner, Playlist, Track, TrackMetadata};
use crate::error::{ExportError, Result};

pub fn audio_url(track_id: &str) -> String {
    format!("http://catalog.test/v1/audio/{}", track_id)
}

pub fn thumbnail_url(track_id: &str) -> String {
    format!("{}/thumbnail", audio_url(track_id))
}

/// Track with listed metadata and no thumbnail
pub fn track(track_id: &str) -> Track {
    Track::new(track_id, audio_url(track_id)).with_metadata(TrackMetadata {
        title: format!("Title {}", track_id),
        artists: vec!["Artist A".to_string(), "Artist B".to_string()],
    })
}

pub fn playlist(id: &str, name: &str, owner: &str) -> Playlist {
    Playlist {
        collection_id: id.to_string(),
        name: name.to_string(),
        owner: Owner {
            user_id: None,
            username: owner.to_string(),
        },
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    playlists: Mutex<Vec<(Playlist, Vec<Track>)>>,
    pub metadata_loads: AtomicUsize,
    pub fail_listing: std::sync::atomic::AtomicBool,
}

impl FakeCatalog {
    pub fn add_playlist(&self, playlist: Playlist, tracks: Vec<Track>) {
        self.playlists.lock().unwrap().push((playlist, tracks));
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(ExportError::Catalog("listing unavailable".to_string()));
        }
        Ok(self
            .playlists
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _)| p.clone())
            .collect())
    }

    async fn track_list(&self, playlist: &Playlist) -> Result<Vec<Track>> {
        self.playlists
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p.collection_id == playlist.collection_id)
            .map(|(_, tracks)| tracks.clone())
            .ok_or_else(|| ExportError::Catalog(format!("no playlist {}", playlist.collection_id)))
    }

    async fn load_metadata(&self, track: &Track) -> Result<TrackMetadata> {
        self.metadata_loads.fetch_add(1, Ordering::SeqCst);
        if track.track_id == "broken" {
            return Err(ExportError::Catalog("track endpoint down".to_string()));
        }
        Ok(TrackMetadata {
            title: format!("Loaded {}", track.track_id),
            artists: vec!["Loaded Artist".to_string()],
        })
    }
}

/// Serves registered URLs; anything else fails like a 404
#[derive(Default)]
pub struct FakeFetcher {
    responses: Mutex<HashMap<String, FetchedMedia>>,
    pub calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn serve(&self, url: &str, content_type: Option<&str>, data: &[u8]) {
        self.responses.lock().unwrap().insert(
            url.to_string(),
            FetchedMedia {
                data: Bytes::copy_from_slice(data),
                content_type: content_type.map(str::to_string),
            },
        );
    }
}

#[async_trait]
impl MediaFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedMedia> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| ExportError::transport(url, "status 404 Not Found"))
    }
}

/// Copies the source to the destination, or leaves a partial file and fails
///
/// Like ffmpeg without `-y`, it probes the input first and then refuses to
/// overwrite an existing output.
#[derive(Default)]
pub struct FakeTranscoder {
    failing: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
}

impl FakeTranscoder {
    pub fn fail_on(&self, track_id: &str) {
        self.failing.lock().unwrap().push(track_id.to_string());
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, source: &Path, dest: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        if dest.exists() {
            return Err(ExportError::ExternalTool(
                "File exists. Not overwriting - exiting".to_string(),
            ));
        }

        if self.failing.lock().unwrap().contains(&stem) {
            std::fs::write(dest, b"partial").unwrap();
            return Err(ExportError::ExternalTool("ffmpeg exited with 1".to_string()));
        }

        tokio::fs::copy(source, dest)
            .await
            .map_err(|e| ExportError::io(dest, e))?;
        Ok(())
    }
}

/// Records the tags written per path
#[derive(Default)]
pub struct FakeTagger {
    written: Mutex<HashMap<PathBuf, TrackTags>>,
    failing: Mutex<Vec<String>>,
}

impl FakeTagger {
    pub fn tags_for(&self, path: &Path) -> Option<TrackTags> {
        self.written.lock().unwrap().get(path).cloned()
    }

    pub fn fail_on(&self, track_id: &str) {
        self.failing.lock().unwrap().push(track_id.to_string());
    }
}

#[async_trait]
impl MetadataTagger for FakeTagger {
    async fn tag(&self, path: &Path, tags: TrackTags) -> Result<()> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        if self.failing.lock().unwrap().contains(&stem) {
            return Err(ExportError::TagWrite {
                path: path.to_path_buf(),
                message: "no tag for you".to_string(),
            });
        }
        self.written.lock().unwrap().insert(path.to_path_buf(), tags);
        Ok(())
    }
}

/// Fakes plus isolated output and scratch directories
pub struct TestEnv {
    pub catalog: Arc<FakeCatalog>,
    pub fetcher: Arc<FakeFetcher>,
    pub transcoder: Arc<FakeTranscoder>,
    pub tagger: Arc<FakeTagger>,
    pub output: TempDir,
    pub scratch: ScratchDir,
    _scratch_root: TempDir,
}

impl TestEnv {
    pub async fn new() -> Self {
        let scratch_root = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::prepare(scratch_root.path().join("tmp"))
            .await
            .unwrap();

        Self {
            catalog: Arc::new(FakeCatalog::default()),
            fetcher: Arc::new(FakeFetcher::default()),
            transcoder: Arc::new(FakeTranscoder::default()),
            tagger: Arc::new(FakeTagger::default()),
            output: tempfile::tempdir().unwrap(),
            scratch,
            _scratch_root: scratch_root,
        }
    }

    pub fn services(&self) -> PipelineServices {
        PipelineServices {
            catalog: self.catalog.clone(),
            fetcher: self.fetcher.clone(),
            transcoder: self.transcoder.clone(),
            tagger: self.tagger.clone(),
        }
    }

    pub fn pipeline(&self) -> TrackPipeline {
        TrackPipeline::new(self.services(), self.scratch.clone())
    }
}
