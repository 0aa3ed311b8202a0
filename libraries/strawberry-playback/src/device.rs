//! Media output device capability
//!
//! Abstracts "the thing that decodes and outputs audio from a URL" so the
//! controller can drive a browser element, a native decoder, or an in-memory
//! fake in tests.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Media output device
///
/// All commands are fire-and-forget requests. Only `play` reports failure,
/// and the controller never propagates it to its own caller.
pub trait MediaDevice: Send {
    /// Replace the loaded media with `url`
    fn load(&mut self, url: &str);

    /// Start or resume output
    ///
    /// # Returns
    /// * `Ok(())` - Request accepted
    /// * `Err(PlaybackError::PlaybackRejected)` - Host policy denied playback
    fn play(&mut self) -> Result<()>;

    /// Pause output
    fn pause(&mut self);

    /// Move the playhead
    fn set_current_time(&mut self, seconds: f64);

    /// Set the output level (0.0-1.0)
    fn set_volume(&mut self, level: f32);

    /// Actual transport state, which may disagree with the controller's intent
    fn is_paused(&self) -> bool;

    /// Actual playhead position in seconds
    fn current_time(&self) -> f64;
}

/// Notifications emitted by the media output device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DeviceNotification {
    /// Playback progressed (`timeupdate`)
    TimeUpdate { seconds: f64 },

    /// Duration became known (`loadedmetadata`)
    LoadedMetadata { duration: f64 },

    /// Output stalled waiting for data (`waiting`)
    Waiting,

    /// Enough data buffered to continue (`canplay`)
    CanPlay,

    /// End of stream reached (`ended`)
    Ended,
}
