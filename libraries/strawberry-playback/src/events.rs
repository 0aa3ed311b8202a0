//! Controller events
//!
//! Inbound: everything that can drive the controller, funneled through one
//! queue (`ControllerEvent`).
//!
//! Outbound: notifications for observers (`PlaybackEvent`), queued by the
//! controller and drained after each transition.

use crate::catalog::CatalogLoad;
use crate::device::DeviceNotification;
use crate::surface::SurfaceCommand;
use crate::types::{RepeatMode, Track, Visibility};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// User intents (buttons, sliders, track list, keyboard shortcuts)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum UserIntent {
    TogglePlayPause,
    Play,
    Pause,
    Next,
    Previous,
    SelectTrack { index: usize },
    SeekPercent { percent: f64 },
    SeekSeconds { seconds: f64 },
    SetVolume { level: f32 },
    ToggleMute,
    ToggleShuffle,
    ToggleRepeat,
}

/// Anything that can drive the controller
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// User intent
    Intent(UserIntent),

    /// Media output device notification
    Device(DeviceNotification),

    /// Track list replaced wholesale
    CatalogReplaced(Vec<Track>),

    /// Result of a catalog provider fetch (may carry the fallback)
    CatalogLoaded(CatalogLoad),

    /// Foreground/background transition
    Visibility(Visibility),

    /// OS media control surface command
    Surface(SurfaceCommand),

    /// Timer tick for the recovery watchdog
    Tick(Instant),
}

impl From<UserIntent> for ControllerEvent {
    fn from(intent: UserIntent) -> Self {
        ControllerEvent::Intent(intent)
    }
}

impl From<DeviceNotification> for ControllerEvent {
    fn from(notification: DeviceNotification) -> Self {
        ControllerEvent::Device(notification)
    }
}

impl From<SurfaceCommand> for ControllerEvent {
    fn from(command: SurfaceCommand) -> Self {
        ControllerEvent::Surface(command)
    }
}

impl From<Visibility> for ControllerEvent {
    fn from(visibility: Visibility) -> Self {
        ControllerEvent::Visibility(visibility)
    }
}

/// Events emitted by the controller for observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Intended playback state changed
    StateChanged {
        /// New intent
        is_playing: bool,
    },

    /// Active track changed
    TrackChanged {
        /// Index into the active catalog
        index: usize,
        /// ID of the new track
        track_id: u32,
        /// ID of the previous track (if any)
        previous_track_id: Option<u32>,
    },

    /// Current track restarted from the beginning
    TrackRestarted {
        /// ID of the restarted track
        track_id: u32,
    },

    /// Last track of a non-repeating playlist finished
    PlaylistEnded,

    /// Volume or mute changed
    VolumeChanged {
        /// Stored level (0.0-1.0)
        level: f32,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Shuffle toggled
    ShuffleChanged {
        /// New shuffle flag
        is_shuffled: bool,
    },

    /// Repeat mode cycled
    RepeatChanged {
        /// New repeat mode
        mode: RepeatMode,
    },

    /// Buffering flag changed
    BufferingChanged {
        /// New buffering flag
        is_buffering: bool,
    },

    /// Catalog replaced
    CatalogReplaced {
        /// New catalog length
        length: usize,
        /// Whether the built-in fallback is active
        using_fallback: bool,
    },

    /// Device refused to start playback; intent left as requested
    PlaybackRejected {
        /// Rejection reason reported by the device
        message: String,
    },

    /// Device was restarted after the host suspended it
    PlaybackRecovered {
        /// Position playback resumed from
        position_seconds: f64,
    },
}
