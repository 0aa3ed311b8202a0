//! Strawberry Player - Playback Controller
//!
//! Platform-agnostic playback state controller for a single-stream audio
//! player.
//!
//! This crate provides:
//! - One authoritative playback state record (track, intent, position, volume)
//! - Manual and automatic advance (shuffle, repeat none/all/one)
//! - Device notification folding (progress, metadata, buffering, end of stream)
//! - Background recovery watchdog (host-suspended audio)
//! - OS media control surface mirroring and command routing
//! - Catalog loading with a built-in fallback
//! - A tokio driver that serializes every input through one queue
//!
//! # Architecture
//!
//! `strawberry-playback` owns no audio output and no UI:
//! - Audio output is a [`MediaDevice`] supplied by the platform
//! - Lock screen / media keys are a [`ControlSurface`]
//! - Track lists come from a [`CatalogProvider`]
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use strawberry_playback::{
//!     MediaDevice, PlaybackConfig, PlaybackController, DeviceNotification, Result,
//! };
//!
//! #[derive(Default)]
//! struct SilentDevice {
//!     paused: bool,
//! }
//!
//! impl MediaDevice for SilentDevice {
//!     fn load(&mut self, _url: &str) {
//!         self.paused = true;
//!     }
//!     fn play(&mut self) -> Result<()> {
//!         self.paused = false;
//!         Ok(())
//!     }
//!     fn pause(&mut self) {
//!         self.paused = true;
//!     }
//!     fn set_current_time(&mut self, _seconds: f64) {}
//!     fn set_volume(&mut self, _level: f32) {}
//!     fn is_paused(&self) -> bool {
//!         self.paused
//!     }
//!     fn current_time(&self) -> f64 {
//!         0.0
//!     }
//! }
//!
//! let mut controller =
//!     PlaybackController::new(PlaybackConfig::default(), Box::new(SilentDevice::default()));
//!
//! // Starts on the first fallback track, paused
//! assert_eq!(controller.current_index(), Some(0));
//!
//! controller.toggle_play_pause();
//! assert!(controller.is_playing());
//!
//! // The device reports the end of the stream
//! controller.on_device_notification(DeviceNotification::Ended);
//! assert_eq!(controller.current_index(), Some(1));
//! ```
//!
//! # Example: Driving from async code
//!
//! ```rust,no_run
//! # use strawberry_playback::{MediaDevice, Result};
//! # struct SilentDevice;
//! # impl MediaDevice for SilentDevice {
//! #     fn load(&mut self, _url: &str) {}
//! #     fn play(&mut self) -> Result<()> { Ok(()) }
//! #     fn pause(&mut self) {}
//! #     fn set_current_time(&mut self, _seconds: f64) {}
//! #     fn set_volume(&mut self, _level: f32) {}
//! #     fn is_paused(&self) -> bool { true }
//! #     fn current_time(&self) -> f64 { 0.0 }
//! # }
//! use strawberry_playback::{ControllerHandle, PlaybackConfig, PlaybackController, UserIntent};
//!
//! # async fn run() -> Result<()> {
//! let config = PlaybackConfig::default();
//! let tick = config.watchdog_interval;
//! let controller = PlaybackController::new(config, Box::new(SilentDevice));
//! let handle = ControllerHandle::spawn(controller, tick);
//!
//! handle.send(UserIntent::SelectTrack { index: 2 }).await?;
//!
//! let mut snapshots = handle.subscribe();
//! snapshots.changed().await.ok();
//! println!("Now playing: {:?}", snapshots.borrow().current_track);
//!
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod advance;
pub mod catalog;
mod controller;
mod device;
mod driver;
mod error;
mod events;
mod state;
mod surface;
pub mod types;
mod volume;
mod watchdog;

// Public exports
pub use catalog::{load_catalog, CatalogLoad, CatalogProvider, ListingEntry};
pub use controller::PlaybackController;
pub use device::{DeviceNotification, MediaDevice};
pub use driver::ControllerHandle;
pub use error::{PlaybackError, Result};
pub use events::{ControllerEvent, PlaybackEvent, UserIntent};
pub use state::PlaybackSnapshot;
pub use surface::{
    Artwork, ControlSurface, NoControlSurface, NowPlayingMetadata, SurfaceCommand,
    SurfacePlaybackState,
};
pub use types::{PlaybackConfig, RepeatMode, Track, Visibility};
pub use volume::Volume;
