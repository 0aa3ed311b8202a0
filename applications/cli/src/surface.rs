//! Terminal control surface
//!
//! There is no lock screen in a terminal, so "mirroring" means logging what
//! an OS media session would show.

use strawberry_playback::{ControlSurface, NowPlayingMetadata, SurfacePlaybackState};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct LogSurface {
    attached: bool,
}

impl LogSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ControlSurface for LogSurface {
    fn attach(&mut self) {
        self.attached = true;
        debug!("Media session handlers registered");
    }

    fn detach(&mut self) {
        self.attached = false;
        debug!("Media session handlers removed");
    }

    fn set_metadata(&mut self, metadata: &NowPlayingMetadata) {
        info!(
            "Now playing: {} - {} ({})",
            metadata.artist, metadata.title, metadata.album
        );
    }

    fn set_playback_state(&mut self, state: SurfacePlaybackState) {
        debug!("Media session state: {:?}", state);
    }
}
