//! OS media control surface
//!
//! One-directional metadata mirror plus a command intake. Commands are plain
//! values fed back into the controller's event queue, so they run through the
//! same transitions as user input.

use crate::types::Track;
use serde::{Deserialize, Serialize};

/// Metadata pushed to the control surface for the active track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlayingMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub artwork: Vec<Artwork>,
}

/// Artwork entry advertised to the control surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl From<&Track> for NowPlayingMetadata {
    fn from(track: &Track) -> Self {
        Self {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            artwork: vec![Artwork {
                src: track.cover_url.clone(),
                sizes: "300x300".to_string(),
                mime_type: "image/jpeg".to_string(),
            }],
        }
    }
}

/// Playback flag shown by the control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfacePlaybackState {
    Playing,
    Paused,
}

impl From<bool> for SurfacePlaybackState {
    fn from(is_playing: bool) -> Self {
        if is_playing {
            SurfacePlaybackState::Playing
        } else {
            SurfacePlaybackState::Paused
        }
    }
}

/// Commands issued by the control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceCommand {
    Play,
    Pause,
    #[serde(rename = "previoustrack")]
    PreviousTrack,
    #[serde(rename = "nexttrack")]
    NextTrack,
}

/// OS media control surface
pub trait ControlSurface: Send {
    /// Register command handlers; called once when the controller starts
    fn attach(&mut self) {}

    /// Unregister command handlers; called exactly once on disposal
    fn detach(&mut self) {}

    /// Mirror now-playing metadata
    fn set_metadata(&mut self, metadata: &NowPlayingMetadata);

    /// Mirror the playback flag
    fn set_playback_state(&mut self, state: SurfacePlaybackState);
}

/// Control surface for hosts without one
#[derive(Debug, Default, Clone, Copy)]
pub struct NoControlSurface;

impl ControlSurface for NoControlSurface {
    fn set_metadata(&mut self, _metadata: &NowPlayingMetadata) {}

    fn set_playback_state(&mut self, _state: SurfacePlaybackState) {}
}

/// Keeps the control surface in step with the controller
///
/// Metadata is pushed only when the active track actually changes; the
/// playback flag is pushed only when it differs from what the surface last
/// saw.
pub(crate) struct SurfaceMirror {
    surface: Box<dyn ControlSurface>,
    last_track_id: Option<u32>,
    last_state: Option<SurfacePlaybackState>,
    attached: bool,
}

impl SurfaceMirror {
    pub(crate) fn new(surface: Box<dyn ControlSurface>) -> Self {
        Self {
            surface,
            last_track_id: None,
            last_state: None,
            attached: false,
        }
    }

    pub(crate) fn attach(&mut self) {
        if !self.attached {
            self.surface.attach();
            self.attached = true;
        }
    }

    pub(crate) fn detach(&mut self) {
        if self.attached {
            self.surface.detach();
            self.attached = false;
        }
    }

    /// Push whatever changed since the last sync
    pub(crate) fn sync(&mut self, track: Option<&Track>, is_playing: bool) {
        let track_id = track.map(|t| t.id);
        if track_id != self.last_track_id {
            if let Some(track) = track {
                self.surface.set_metadata(&NowPlayingMetadata::from(track));
            }
            self.last_track_id = track_id;
        }

        let state = SurfacePlaybackState::from(is_playing);
        if self.last_state != Some(state) {
            self.surface.set_playback_state(state);
            self.last_state = Some(state);
        }
    }

    /// Forget the mirrored track so the next sync republishes metadata
    pub(crate) fn invalidate_track(&mut self) {
        self.last_track_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorded {
        metadata: Vec<NowPlayingMetadata>,
        states: Vec<SurfacePlaybackState>,
        attach_calls: usize,
        detach_calls: usize,
    }

    struct RecordingSurface(Arc<Mutex<Recorded>>);

    impl ControlSurface for RecordingSurface {
        fn attach(&mut self) {
            self.0.lock().unwrap().attach_calls += 1;
        }

        fn detach(&mut self) {
            self.0.lock().unwrap().detach_calls += 1;
        }

        fn set_metadata(&mut self, metadata: &NowPlayingMetadata) {
            self.0.lock().unwrap().metadata.push(metadata.clone());
        }

        fn set_playback_state(&mut self, state: SurfacePlaybackState) {
            self.0.lock().unwrap().states.push(state);
        }
    }

    fn track(id: u32) -> Track {
        Track {
            id,
            title: format!("Track {}", id),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            duration_hint: 180,
            cover_url: format!("https://example.com/{}.jpg", id),
            media_url: format!("https://example.com/{}.mp3", id),
        }
    }

    #[test]
    fn metadata_pushed_once_per_track() {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let mut mirror = SurfaceMirror::new(Box::new(RecordingSurface(recorded.clone())));

        let first = track(1);
        mirror.sync(Some(&first), false);
        mirror.sync(Some(&first), true);
        mirror.sync(Some(&first), true);

        let second = track(2);
        mirror.sync(Some(&second), true);

        let recorded = recorded.lock().unwrap();
        let titles: Vec<&str> = recorded.metadata.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Track 1", "Track 2"]);
        assert_eq!(
            recorded.states,
            vec![SurfacePlaybackState::Paused, SurfacePlaybackState::Playing]
        );
    }

    #[test]
    fn invalidate_republishes_metadata() {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let mut mirror = SurfaceMirror::new(Box::new(RecordingSurface(recorded.clone())));

        let first = track(1);
        mirror.sync(Some(&first), true);
        mirror.invalidate_track();
        mirror.sync(Some(&first), true);

        assert_eq!(recorded.lock().unwrap().metadata.len(), 2);
    }

    #[test]
    fn attach_and_detach_are_balanced() {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let mut mirror = SurfaceMirror::new(Box::new(RecordingSurface(recorded.clone())));

        mirror.attach();
        mirror.attach();
        mirror.detach();
        mirror.detach();

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.attach_calls, 1);
        assert_eq!(recorded.detach_calls, 1);
    }

    #[test]
    fn metadata_carries_artwork() {
        let metadata = NowPlayingMetadata::from(&track(4));
        assert_eq!(metadata.artwork.len(), 1);
        assert_eq!(metadata.artwork[0].src, "https://example.com/4.jpg");
        assert_eq!(metadata.artwork[0].sizes, "300x300");
    }

    #[test]
    fn command_names_match_media_session_actions() {
        let cmd: SurfaceCommand = serde_json::from_str("\"nexttrack\"").unwrap();
        assert_eq!(cmd, SurfaceCommand::NextTrack);
        let cmd: SurfaceCommand = serde_json::from_str("\"previoustrack\"").unwrap();
        assert_eq!(cmd, SurfaceCommand::PreviousTrack);
    }
}
