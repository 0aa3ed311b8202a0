//! Track catalog
//!
//! The controller never fetches tracks itself. A [`CatalogProvider`] supplies
//! them; [`load_catalog`] applies the fallback rule (failure or an empty list
//! substitutes the six built-in demo tracks).
//!
//! Storage listings (path + URL pairs) are turned into tracks by parsing the
//! file name:
//! - `Artist - Album - Title.mp3`
//! - `Artist - Title.mp3`
//! - `Title.mp3`

use crate::error::{PlaybackError, Result};
use crate::types::Track;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// File extensions recognised as playable audio (compared case-insensitively)
pub const AUDIO_EXTENSIONS: [&str; 7] = ["mp3", "m4a", "wav", "ogg", "flac", "aac", "wma"];

/// Cover images assigned to listing entries, rotated by position
pub const DEFAULT_COVERS: [&str; 6] = [
    "https://images.unsplash.com/photo-1493225457124-a3eb161ffa5f?w=300&h=300&fit=crop",
    "https://images.unsplash.com/photo-1514525253161-7a46d19cd819?w=300&h=300&fit=crop",
    "https://images.unsplash.com/photo-1459749411175-04bf5292ceea?w=300&h=300&fit=crop",
    "https://images.unsplash.com/photo-1501386761578-eac5c94b800a?w=300&h=300&fit=crop",
    "https://images.unsplash.com/photo-1511671782779-c97d3d27a1d4?w=300&h=300&fit=crop",
    "https://images.unsplash.com/photo-1470225620780-dba8ba36b745?w=300&h=300&fit=crop",
];

const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Source of the track list
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch the ordered track list
    ///
    /// May fail or return an empty list; [`load_catalog`] handles both.
    async fn get_catalog(&self) -> Result<Vec<Track>>;
}

/// Outcome of a catalog fetch after the fallback rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogLoad {
    /// Tracks to hand to the controller (never empty)
    pub tracks: Vec<Track>,

    /// Whether the built-in fallback was substituted
    pub using_fallback: bool,

    /// Why the fallback was used, when the provider failed
    pub error: Option<String>,
}

impl CatalogLoad {
    /// Fallback catalog carrying the reason it was needed
    pub fn fallback(error: Option<String>) -> Self {
        Self {
            tracks: fallback_catalog(),
            using_fallback: true,
            error,
        }
    }
}

/// Fetch from `provider`, substituting the fallback catalog on failure or
/// emptiness
pub async fn load_catalog(provider: &dyn CatalogProvider) -> CatalogLoad {
    match provider.get_catalog().await {
        Ok(tracks) if !tracks.is_empty() => {
            info!("Loaded {} tracks from catalog provider", tracks.len());
            CatalogLoad {
                tracks,
                using_fallback: false,
                error: None,
            }
        }
        Ok(_) => {
            warn!("Catalog provider returned no tracks, using fallback tracks");
            CatalogLoad::fallback(None)
        }
        Err(e) => {
            warn!("Failed to fetch tracks: {}", e);
            let message = match e {
                PlaybackError::CatalogUnavailable(message) => message,
                other => other.to_string(),
            };
            CatalogLoad::fallback(Some(message))
        }
    }
}

/// Entry of a storage listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    /// Storage path, e.g. `music/Artist - Title.mp3`
    pub pathname: String,

    /// Public URL of the object
    pub url: String,
}

/// Convert a storage listing into tracks
///
/// Non-audio entries are dropped and the rest are ordered by pathname. IDs
/// are 1-based positions in the resulting list.
pub fn tracks_from_listing(entries: &[ListingEntry]) -> Vec<Track> {
    let mut audio: Vec<&ListingEntry> = entries
        .iter()
        .filter(|entry| is_audio_path(&entry.pathname))
        .collect();
    audio.sort_by(|a, b| a.pathname.cmp(&b.pathname));

    audio
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let meta = parse_filename(&entry.pathname);
            Track {
                id: index as u32 + 1,
                title: meta.title,
                artist: meta.artist,
                album: meta.album,
                duration_hint: 0,
                cover_url: cover_for_index(index).to_string(),
                media_url: entry.url.clone(),
            }
        })
        .collect()
}

/// Whether `pathname` has a recognised audio extension
pub fn is_audio_path(pathname: &str) -> bool {
    Path::new(pathname)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Metadata recovered from a file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameMetadata {
    pub artist: String,
    pub album: String,
    pub title: String,
}

/// Parse `Artist - Album - Title`, `Artist - Title` or `Title` out of a path
pub fn parse_filename(pathname: &str) -> FilenameMetadata {
    let filename = pathname.rsplit('/').next().unwrap_or(pathname);
    let stem = if is_audio_path(filename) {
        filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(filename)
    } else {
        filename
    };

    let parts: Vec<&str> = stem.split(" - ").map(str::trim).collect();

    match parts.as_slice() {
        [artist, album, rest @ ..] if !rest.is_empty() => FilenameMetadata {
            artist: artist.to_string(),
            album: album.to_string(),
            title: rest.join(" - "),
        },
        [artist, title] => FilenameMetadata {
            artist: artist.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            title: title.to_string(),
        },
        _ => FilenameMetadata {
            artist: UNKNOWN_ARTIST.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            title: stem.to_string(),
        },
    }
}

/// Cover image for the track at `index`
pub fn cover_for_index(index: usize) -> &'static str {
    DEFAULT_COVERS[index % DEFAULT_COVERS.len()]
}

/// Format whole seconds as `m:ss`
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Built-in demo catalog used when the provider fails or is empty
pub fn fallback_catalog() -> Vec<Track> {
    const SONGS: [(&str, &str, &str, u32); 6] = [
        ("Midnight Dreams", "Strawberry Studios", "Night Sessions", 245),
        ("Electric Sunset", "Neon Pulse", "Synthwave Collection", 198),
        ("Ocean Waves", "Calm Waters", "Relaxation", 312),
        ("City Lights", "Urban Beats", "Metropolitan", 276),
        ("Forest Walk", "Nature Sounds", "Ambient Journey", 289),
        ("Starlight", "Cosmic Dreams", "Galaxy", 234),
    ];

    SONGS
        .iter()
        .enumerate()
        .map(|(index, (title, artist, album, duration))| Track {
            id: index as u32 + 1,
            title: title.to_string(),
            artist: artist.to_string(),
            album: album.to_string(),
            duration_hint: *duration,
            cover_url: cover_for_index(index).to_string(),
            media_url: format!(
                "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-{}.mp3",
                index + 1
            ),
        })
        .collect()
}
