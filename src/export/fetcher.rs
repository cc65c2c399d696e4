//! Remote media retrieval and content-type classification

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;

use crate::error::{ExportError, Result};

/// Bytes returned by a fetch together with the declared content type
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    pub data: Bytes,
    pub content_type: Option<String>,
}

/// Retrieves raw bytes for a URL
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch a URL; any network failure or non-2xx status is a transport error
    async fn fetch(&self, url: &str) -> Result<FetchedMedia>;
}

/// Map a declared audio content type to the extension of the temp file
///
/// Only the two types the catalog is known to serve are accepted.
pub fn audio_extension(content_type: Option<&str>) -> Result<&'static str> {
    let declared = content_type.unwrap_or("");
    let unsupported = || ExportError::UnsupportedFormat(declared.to_string());

    let essence = declared
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    let subtype = essence.strip_prefix("audio/").ok_or_else(unsupported)?;

    match subtype {
        "webm" => Ok("webm"),
        "mpeg" => Ok("mp3"),
        _ => Err(unsupported()),
    }
}

/// reqwest-backed fetcher
#[derive(Clone)]
pub struct HttpFetcher {
    http_client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(concat!("pb-export/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExportError::transport("", e))?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl MediaFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedMedia> {
        debug!("Fetching media: {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ExportError::transport(url, e))?;

        if !response.status().is_success() {
            return Err(ExportError::transport(
                url,
                format!("status {}", response.status()),
            ));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let data = response
            .bytes()
            .await
            .map_err(|e| ExportError::transport(url, e))?;

        Ok(FetchedMedia { data, content_type })
    }
}
