//! Embedding title, artists and cover art into finished audio files

use async_trait::async_trait;
use bytes::Bytes;
use lofty::config::WriteOptions;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::*;
use lofty::probe::Probe;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{ExportError, Result};
use crate::utils::cover_art;

/// Description stored with every embedded cover
pub const COVER_DESCRIPTION: &str = "From Pipe Bomb";

/// Tag values written into an exported file
#[derive(Debug, Clone, PartialEq)]
pub struct TrackTags {
    pub title: String,
    pub artists: Vec<String>,
    pub cover: Option<Bytes>,
}

impl TrackTags {
    /// Single artist string as stored in the artist field
    pub fn artist(&self) -> String {
        self.artists.join(", ")
    }
}

/// Writes tags into an already transcoded file
#[async_trait]
pub trait MetadataTagger: Send + Sync {
    async fn tag(&self, path: &Path, tags: TrackTags) -> Result<()>;
}

/// lofty-backed tagger
///
/// Tag writing is blocking file I/O, so it runs on the blocking thread pool.
#[derive(Debug, Clone, Default)]
pub struct LoftyTagger;

#[async_trait]
impl MetadataTagger for LoftyTagger {
    async fn tag(&self, path: &Path, tags: TrackTags) -> Result<()> {
        let path_buf = path.to_path_buf();
        tokio::task::spawn_blocking(move || write_tags(&path_buf, &tags))
            .await
            .map_err(|e| ExportError::TagWrite {
                path: path.to_path_buf(),
                message: format!("tagging task panicked: {}", e),
            })?
    }
}

fn write_tags(path: &Path, tags: &TrackTags) -> Result<()> {
    let tag_error = |message: String| ExportError::TagWrite {
        path: PathBuf::from(path),
        message,
    };

    let mut tagged_file = Probe::open(path)
        .map_err(|e| tag_error(format!("failed to open audio file: {}", e)))?
        .read()
        .map_err(|e| tag_error(format!("failed to read audio file: {}", e)))?;

    // Get or create tag
    let tag = match tagged_file.primary_tag_mut() {
        Some(tag) => tag,
        None => {
            if let Some(tag) = tagged_file.first_tag_mut() {
                tag
            } else {
                let tag_type = tagged_file.primary_tag_type();
                tagged_file.insert_tag(lofty::tag::Tag::new(tag_type));
                tagged_file
                    .primary_tag_mut()
                    .ok_or_else(|| tag_error("failed to create tag".to_string()))?
            }
        }
    };

    tag.set_title(tags.title.clone());
    tag.set_artist(tags.artist());

    if let Some(cover) = &tags.cover {
        let data = match cover_art::normalize_cover_art(cover) {
            Ok(jpeg) => jpeg,
            Err(e) => {
                warn!("Embedding cover of {} as-is: {:#}", path.display(), e);
                cover.to_vec()
            }
        };

        tag.remove_picture_type(PictureType::CoverFront);
        tag.push_picture(Picture::new_unchecked(
            PictureType::CoverFront,
            Some(MimeType::Jpeg),
            Some(COVER_DESCRIPTION.to_string()),
            data,
        ));
    }

    tagged_file
        .save_to_path(path, WriteOptions::default())
        .map_err(|e| tag_error(format!("failed to save tags: {}", e)))?;

    debug!("Tagged: {}", path.display());
    Ok(())
}
