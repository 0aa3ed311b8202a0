//! Playback state record and observer snapshots

use crate::types::{RepeatMode, Track};
use crate::volume::Volume;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The controller's single mutable state record
///
/// Every transition reads and writes this record directly; there are no
/// cached copies elsewhere in the controller.
#[derive(Debug, Clone)]
pub(crate) struct PlaybackState {
    pub(crate) catalog: Arc<Vec<Track>>,
    pub(crate) current_index: Option<usize>,
    pub(crate) is_playing: bool,
    pub(crate) position_seconds: f64,
    pub(crate) duration_seconds: Option<f64>,
    pub(crate) volume: Volume,
    pub(crate) is_shuffled: bool,
    pub(crate) repeat_mode: RepeatMode,
    pub(crate) is_buffering: bool,
    pub(crate) catalog_unavailable: bool,
}

impl PlaybackState {
    pub(crate) fn new(
        catalog: Vec<Track>,
        volume: Volume,
        is_shuffled: bool,
        repeat_mode: RepeatMode,
    ) -> Self {
        let mut state = Self {
            catalog: Arc::new(catalog),
            current_index: None,
            is_playing: false,
            position_seconds: 0.0,
            duration_seconds: None,
            volume,
            is_shuffled,
            repeat_mode,
            is_buffering: false,
            catalog_unavailable: false,
        };
        state.clamp_index();
        state
    }

    pub(crate) fn len(&self) -> usize {
        self.catalog.len()
    }

    pub(crate) fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|index| self.catalog.get(index))
    }

    /// Re-establish the index invariant after the catalog changed
    ///
    /// Returns `true` if the index had to be corrected.
    pub(crate) fn clamp_index(&mut self) -> bool {
        let corrected = match (self.current_index, self.catalog.len()) {
            (_, 0) => None,
            (Some(index), len) if index < len => Some(index),
            _ => Some(0),
        };
        let changed = corrected != self.current_index;
        self.current_index = corrected;
        changed
    }

    pub(crate) fn snapshot(&self, watchdog_armed: bool) -> PlaybackSnapshot {
        PlaybackSnapshot {
            catalog: Arc::clone(&self.catalog),
            current_index: self.current_index,
            current_track: self.current_track().cloned(),
            is_playing: self.is_playing,
            position_seconds: self.position_seconds,
            duration_seconds: self.duration_seconds,
            volume: self.volume.level(),
            is_muted: self.volume.is_muted(),
            is_shuffled: self.is_shuffled,
            repeat_mode: self.repeat_mode,
            is_buffering: self.is_buffering,
            catalog_unavailable: self.catalog_unavailable,
            watchdog_armed,
        }
    }
}

/// Immutable view of the playback state handed to observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// Active catalog
    #[serde(skip)]
    pub catalog: Arc<Vec<Track>>,

    /// Index of the active track (`None` when the catalog is empty)
    pub current_index: Option<usize>,

    /// Active track
    pub current_track: Option<Track>,

    /// Intended playback state
    pub is_playing: bool,

    /// Last reported position
    pub position_seconds: f64,

    /// Duration reported by the device, if known
    pub duration_seconds: Option<f64>,

    /// Stored volume level (0.0-1.0)
    pub volume: f32,

    /// Mute flag
    pub is_muted: bool,

    /// Shuffle flag
    pub is_shuffled: bool,

    /// Repeat mode
    pub repeat_mode: RepeatMode,

    /// Device stalled waiting for data
    pub is_buffering: bool,

    /// Built-in fallback catalog is active because the provider failed or was empty
    pub catalog_unavailable: bool,

    /// Background recovery watchdog is running
    pub watchdog_armed: bool,
}

impl PlaybackSnapshot {
    /// Progress through the current track (0-100)
    pub fn progress_percent(&self) -> f64 {
        match self.duration_seconds {
            Some(duration) if duration > 0.0 => {
                (self.position_seconds / duration * 100.0).clamp(0.0, 100.0)
            }
            _ => 0.0,
        }
    }

    /// Output level the device is using
    pub fn effective_volume(&self) -> f32 {
        if self.is_muted {
            0.0
        } else {
            self.volume
        }
    }
}
