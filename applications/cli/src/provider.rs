//! Catalog providers
//!
//! Both providers accept the same JSON document shapes:
//! - the tracks API response: `{"success": true, "tracks": [...]}`
//! - a bare array of tracks
//! - a raw storage listing: `{"blobs": [{"pathname": ..., "url": ...}]}`

use crate::error::{CliError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use strawberry_playback::catalog::tracks_from_listing;
use strawberry_playback::{CatalogProvider, ListingEntry, Track};
use tracing::debug;

/// Accepted catalog document shapes
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CatalogDocument {
    Response {
        success: bool,
        #[serde(default)]
        tracks: Vec<Track>,
    },
    Tracks(Vec<Track>),
    Listing {
        blobs: Vec<ListingEntry>,
    },
}

impl CatalogDocument {
    /// Parse a catalog document from JSON text
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Tracks carried by the document (empty for an unsuccessful response)
    pub fn into_tracks(self) -> Vec<Track> {
        match self {
            CatalogDocument::Response { success, tracks } => {
                if success {
                    tracks
                } else {
                    Vec::new()
                }
            }
            CatalogDocument::Tracks(tracks) => tracks,
            CatalogDocument::Listing { blobs } => tracks_from_listing(&blobs),
        }
    }
}

/// Fetches the catalog from an HTTP endpoint
pub struct HttpCatalogProvider {
    http: Client,
    url: String,
}

impl HttpCatalogProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(CliError::Catalog(format!(
                "URL must start with http:// or https://, got {}",
                url
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(format!("StrawberryPlayer/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, url })
    }

    async fn fetch(&self) -> Result<Vec<Track>> {
        debug!(url = %self.url, "Fetching catalog");

        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CliError::Catalog(format!("HTTP error! status: {}", status)));
        }

        let text = response.text().await?;
        Ok(CatalogDocument::parse(&text)?.into_tracks())
    }
}

#[async_trait]
impl CatalogProvider for HttpCatalogProvider {
    async fn get_catalog(&self) -> strawberry_playback::Result<Vec<Track>> {
        Ok(self.fetch().await?)
    }
}

/// Reads the catalog from a local JSON file
pub struct FileCatalogProvider {
    path: PathBuf,
}

impl FileCatalogProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read(&self) -> Result<Vec<Track>> {
        debug!(path = %self.path.display(), "Reading catalog");
        let text = tokio::fs::read_to_string(&self.path).await?;
        Ok(CatalogDocument::parse(&text)?.into_tracks())
    }
}

#[async_trait]
impl CatalogProvider for FileCatalogProvider {
    async fn get_catalog(&self) -> strawberry_playback::Result<Vec<Track>> {
        Ok(self.read().await?)
    }
}

/// Pick a provider for `source`: URLs go over HTTP, anything else is a file
pub fn provider_for(source: &str, timeout: Duration) -> Result<Arc<dyn CatalogProvider>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        Ok(Arc::new(HttpCatalogProvider::new(source, timeout)?))
    } else {
        Ok(Arc::new(FileCatalogProvider::new(source)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const API_RESPONSE: &str = r#"{
        "success": true,
        "count": 2,
        "tracks": [
            {"id": 1, "title": "Intro", "artist": "Berry", "album": "Demo",
             "duration": 0, "cover": "https://c/1.jpg", "src": "https://m/intro.mp3"},
            {"id": 2, "title": "Outro", "artist": "Berry", "album": "Demo",
             "duration": 0, "cover": "https://c/2.jpg", "src": "https://m/outro.mp3"}
        ]
    }"#;

    #[test]
    fn test_parse_api_response() {
        let tracks = CatalogDocument::parse(API_RESPONSE).unwrap().into_tracks();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[1].media_url, "https://m/outro.mp3");
    }

    #[test]
    fn test_unsuccessful_response_is_empty() {
        let tracks = CatalogDocument::parse(r#"{"success": false, "error": "no token"}"#)
            .unwrap()
            .into_tracks();
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_parse_listing() {
        let text = r#"{"blobs": [
            {"pathname": "music/b.mp3", "url": "https://blob/b.mp3"},
            {"pathname": "music/notes.txt", "url": "https://blob/notes.txt"},
            {"pathname": "music/Artist - a.flac", "url": "https://blob/a.flac"}
        ]}"#;
        let tracks = CatalogDocument::parse(text).unwrap().into_tracks();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].artist, "Artist");
        assert_eq!(tracks[0].title, "a");
        assert_eq!(tracks[1].title, "b");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(CatalogDocument::parse("not json").is_err());
    }

    #[test]
    fn test_http_provider_requires_scheme() {
        assert!(HttpCatalogProvider::new("music.example.com", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_file_provider_reads_tracks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(API_RESPONSE.as_bytes()).unwrap();

        let provider = FileCatalogProvider::new(file.path());
        let tracks = provider.get_catalog().await.unwrap();

        assert_eq!(tracks.len(), 2);
    }

    #[tokio::test]
    async fn test_file_provider_missing_file_is_unavailable() {
        let provider = FileCatalogProvider::new("/nonexistent/catalog.json");
        let result = provider.get_catalog().await;

        assert!(matches!(
            result,
            Err(strawberry_playback::PlaybackError::CatalogUnavailable(_))
        ));
    }
}
