//! Playback controller - transition engine
//!
//! Owns the single authoritative state record, the media output device and
//! the control-surface mirror. Every input (user intent, device notification,
//! catalog change, visibility change, surface command, timer tick) is one
//! method call that applies a state delta and issues one batch of device
//! commands. Callers are expected to serialize calls; nothing in here blocks.

use crate::{
    advance,
    catalog::{fallback_catalog, CatalogLoad},
    device::{DeviceNotification, MediaDevice},
    error::{PlaybackError, Result},
    events::{ControllerEvent, PlaybackEvent, UserIntent},
    state::{PlaybackSnapshot, PlaybackState},
    surface::{ControlSurface, NoControlSurface, SurfaceCommand, SurfaceMirror},
    types::{PlaybackConfig, RepeatMode, Track, Visibility},
    volume::Volume,
    watchdog::{RecoveryWatchdog, WatchdogTick},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Central playback controller
pub struct PlaybackController {
    // State
    state: PlaybackState,
    config: PlaybackConfig,

    // Collaborators
    device: Box<dyn MediaDevice>,
    surface: SurfaceMirror,

    // Visibility recovery
    visibility: Visibility,
    watchdog: RecoveryWatchdog,

    // URL currently loaded into the device
    loaded_url: Option<String>,

    rng: StdRng,

    // Event queue for observers
    pending_events: Vec<PlaybackEvent>,

    disposed: bool,
}

impl PlaybackController {
    /// Create a controller with the fallback catalog and no control surface
    pub fn new(config: PlaybackConfig, device: Box<dyn MediaDevice>) -> Self {
        Self::with_surface(config, device, Box::new(NoControlSurface))
    }

    /// Create a controller mirroring to `surface`
    ///
    /// The first fallback track is loaded (not played), the configured volume
    /// is applied and the surface command handlers are attached.
    pub fn with_surface(
        config: PlaybackConfig,
        device: Box<dyn MediaDevice>,
        surface: Box<dyn ControlSurface>,
    ) -> Self {
        let state = PlaybackState::new(
            fallback_catalog(),
            Volume::new(config.volume),
            config.shuffle,
            config.repeat,
        );
        let watchdog = RecoveryWatchdog::new(config.watchdog_interval, config.watchdog_ceiling);

        let mut controller = Self {
            state,
            config,
            device,
            surface: SurfaceMirror::new(surface),
            visibility: Visibility::Visible,
            watchdog,
            loaded_url: None,
            rng: StdRng::from_entropy(),
            pending_events: Vec::new(),
            disposed: false,
        };

        controller.surface.attach();
        controller.apply_volume();
        controller.transition(|c| {
            if c.state.current_track().is_some() {
                c.load_current();
            }
        });
        controller.pending_events.clear();
        controller
    }

    /// Replace the shuffle random source (deterministic tests)
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    // ===== Event Intake =====

    /// Dispatch one event from the controller's queue
    ///
    /// Fails only with [`PlaybackError::Disposed`] once [`dispose`](Self::dispose)
    /// has run.
    pub fn handle(&mut self, event: ControllerEvent) -> Result<()> {
        self.handle_at(event, Instant::now())
    }

    /// Dispatch one event, reading time-dependent inputs against `now`
    pub fn handle_at(&mut self, event: ControllerEvent, now: Instant) -> Result<()> {
        if self.disposed {
            debug!("Dropping {:?}: controller disposed", event);
            return Err(PlaybackError::Disposed);
        }

        match event {
            ControllerEvent::Intent(intent) => self.apply_intent(intent),
            ControllerEvent::Device(notification) => self.on_device_notification(notification),
            ControllerEvent::CatalogReplaced(tracks) => self.on_catalog_replaced(tracks),
            ControllerEvent::CatalogLoaded(load) => self.apply_catalog_load(load),
            ControllerEvent::Visibility(visibility) => self.on_visibility_at(visibility, now),
            ControllerEvent::Surface(command) => self.on_surface_command(command),
            ControllerEvent::Tick(now) => self.on_tick(now),
        }

        Ok(())
    }

    /// Apply a user intent
    pub fn apply_intent(&mut self, intent: UserIntent) {
        match intent {
            UserIntent::TogglePlayPause => self.toggle_play_pause(),
            UserIntent::Play => self.play(),
            UserIntent::Pause => self.pause(),
            UserIntent::Next => self.next(),
            UserIntent::Previous => self.previous(),
            UserIntent::SelectTrack { index } => self.select_track(index),
            UserIntent::SeekPercent { percent } => self.seek_to_percent(percent),
            UserIntent::SeekSeconds { seconds } => self.seek_to_seconds(seconds),
            UserIntent::SetVolume { level } => self.set_volume(level),
            UserIntent::ToggleMute => self.toggle_mute(),
            UserIntent::ToggleShuffle => self.toggle_shuffle(),
            UserIntent::ToggleRepeat => self.toggle_repeat(),
        }
    }

    // ===== Playback Control =====

    /// Load and play the track at `index`
    ///
    /// Out-of-range indices are ignored; with an empty catalog this is a no-op.
    pub fn select_track(&mut self, index: usize) {
        self.transition(|c| {
            let len = c.state.len();
            if len == 0 {
                debug!("select_track({}) ignored: empty catalog", index);
                return;
            }
            if index >= len {
                debug!("{}", PlaybackError::IndexOutOfRange { index, len });
                return;
            }

            c.set_playing(true);
            c.state.current_index = Some(index);
            c.load_current();
        });
    }

    /// Pause when playing, play otherwise
    pub fn toggle_play_pause(&mut self) {
        self.transition(|c| {
            if c.state.is_playing {
                c.device.pause();
                c.set_playing(false);
            } else {
                c.start_playback();
            }
        });
    }

    /// Start or resume playback
    ///
    /// No-op when already playing, unless the device is silent after a
    /// rejected request, in which case play is requested again.
    pub fn play(&mut self) {
        self.transition(|c| {
            if !c.state.is_playing {
                c.start_playback();
            } else if c.device.is_paused() && c.state.current_track().is_some() {
                debug!("Retrying play on silent device");
                c.request_play();
            }
        });
    }

    /// Pause playback (no-op when already paused)
    pub fn pause(&mut self) {
        self.transition(|c| {
            if c.state.is_playing {
                c.device.pause();
                c.set_playing(false);
            }
        });
    }

    /// Manual skip to the next track
    ///
    /// Always leaves playback running. Under repeat-one the current track
    /// restarts instead of advancing.
    pub fn next(&mut self) {
        self.transition(|c| {
            let Some(current) = c.state.current_index else {
                return;
            };

            c.set_playing(true);

            if c.state.repeat_mode == RepeatMode::One {
                c.restart_current();
                return;
            }

            if let Some(next) =
                advance::next_index(current, c.state.len(), c.state.is_shuffled, &mut c.rng)
            {
                c.move_to(next);
            }
        });
    }

    /// Go to the previous track, or restart the current one
    ///
    /// Past the restart threshold (default 3s) the current track restarts
    /// without touching the playing intent. Otherwise moves back one track
    /// (wrapping to the last) and plays.
    pub fn previous(&mut self) {
        self.transition(|c| {
            let Some(current) = c.state.current_index else {
                return;
            };

            if c.state.position_seconds > c.config.restart_threshold.as_secs_f64() {
                c.rewind();
                return;
            }

            if let Some(prev) = advance::previous_index(current, c.state.len()) {
                c.set_playing(true);
                c.move_to(prev);
            }
        });
    }

    // ===== Seek =====

    /// Seek by percentage (0-100) of the reported duration
    pub fn seek_to_percent(&mut self, percent: f64) {
        let percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        let duration = self.state.duration_seconds.unwrap_or(0.0);
        self.seek_to_seconds(percent / 100.0 * duration);
    }

    /// Seek to an absolute position in seconds
    pub fn seek_to_seconds(&mut self, seconds: f64) {
        self.transition(|c| {
            if c.state.current_track().is_none() {
                return;
            }

            let mut target = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
            if let Some(duration) = c.state.duration_seconds {
                target = target.min(duration);
            }

            c.device.set_current_time(target);
            c.state.position_seconds = target;
        });
    }

    // ===== Volume =====

    /// Set volume (0.0-1.0); raising it above zero clears mute
    pub fn set_volume(&mut self, level: f32) {
        self.transition(|c| {
            c.state.volume.set_level(level);
            c.apply_volume();
            c.emit_volume_changed();
        });
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.transition(|c| {
            c.state.volume.toggle_mute();
            c.apply_volume();
            c.emit_volume_changed();
        });
    }

    // ===== Shuffle & Repeat =====

    /// Toggle shuffle
    pub fn toggle_shuffle(&mut self) {
        self.transition(|c| {
            c.state.is_shuffled = !c.state.is_shuffled;
            c.pending_events.push(PlaybackEvent::ShuffleChanged {
                is_shuffled: c.state.is_shuffled,
            });
        });
    }

    /// Cycle repeat mode `none -> all -> one -> none`
    pub fn toggle_repeat(&mut self) {
        self.transition(|c| {
            c.state.repeat_mode = c.state.repeat_mode.cycle();
            c.pending_events.push(PlaybackEvent::RepeatChanged {
                mode: c.state.repeat_mode,
            });
        });
    }

    // ===== Catalog =====

    /// Replace the catalog wholesale
    ///
    /// The index is clamped back to 0 when it falls outside the new catalog.
    /// Playing intent is left untouched; if the active track changed, it is
    /// loaded (and played when the intent says so).
    pub fn on_catalog_replaced(&mut self, tracks: Vec<Track>) {
        self.replace_catalog(tracks, false);
    }

    /// Apply a catalog fetch result, recording the fallback advisory
    pub fn apply_catalog_load(&mut self, load: CatalogLoad) {
        if let Some(ref error) = load.error {
            warn!("Using fallback catalog: {}", error);
        }
        self.replace_catalog(load.tracks, load.using_fallback);
    }

    fn replace_catalog(&mut self, tracks: Vec<Track>, using_fallback: bool) {
        self.transition(|c| {
            c.state.catalog = Arc::new(tracks);
            c.state.catalog_unavailable = using_fallback;

            if c.state.clamp_index() {
                debug!(
                    "Catalog shrank to {} tracks, index reset to {:?}",
                    c.state.len(),
                    c.state.current_index
                );
            }

            c.surface.invalidate_track();

            let active_url = c.state.current_track().map(|t| t.media_url.clone());
            if active_url.is_some() && active_url != c.loaded_url {
                c.load_current();
            }

            c.pending_events.push(PlaybackEvent::CatalogReplaced {
                length: c.state.len(),
                using_fallback,
            });
        });
    }

    // ===== Device Events =====

    /// Fold a device notification into the state
    pub fn on_device_notification(&mut self, notification: DeviceNotification) {
        self.transition(|c| match notification {
            DeviceNotification::TimeUpdate { seconds } => {
                if seconds.is_finite() && seconds >= 0.0 {
                    c.state.position_seconds = seconds;
                }
            }
            DeviceNotification::LoadedMetadata { duration } => {
                if duration.is_finite() && duration > 0.0 {
                    c.state.duration_seconds = Some(duration);
                }
                c.set_buffering(false);
            }
            DeviceNotification::Waiting => c.set_buffering(true),
            DeviceNotification::CanPlay => c.set_buffering(false),
            DeviceNotification::Ended => c.end_of_track(),
        });
    }

    /// Automatic advance when the device reaches the end of the stream
    fn end_of_track(&mut self) {
        let Some(current) = self.state.current_index else {
            return;
        };
        let len = self.state.len();

        if self.state.repeat_mode == RepeatMode::One {
            self.set_playing(true);
            self.restart_current();
            return;
        }

        let Some(next) = advance::next_index(current, len, self.state.is_shuffled, &mut self.rng)
        else {
            return;
        };

        let keeps_going =
            self.state.is_shuffled || self.state.repeat_mode == RepeatMode::All;
        let wrapped_from_last = next == 0 && current == len - 1;

        if !keeps_going && wrapped_from_last {
            info!("Reached end of playlist");
            self.set_playing(false);
            self.device.pause();
            self.rewind();
            if next != current {
                self.state.current_index = Some(next);
                self.load_current();
            }
            self.pending_events.push(PlaybackEvent::PlaylistEnded);
            return;
        }

        self.set_playing(true);
        self.move_to(next);
    }

    // ===== Visibility =====

    /// Handle a foreground/background transition
    pub fn on_visibility(&mut self, visibility: Visibility) {
        self.on_visibility_at(visibility, Instant::now());
    }

    /// Handle a foreground/background transition observed at `now`
    ///
    /// Repeated events for the state we are already in are ignored, so
    /// reconciliation runs once per actual transition.
    pub fn on_visibility_at(&mut self, visibility: Visibility, now: Instant) {
        self.transition(|c| {
            if c.visibility == visibility {
                debug!("Ignoring repeated {:?} event", visibility);
                return;
            }
            c.visibility = visibility;

            match visibility {
                Visibility::Visible => {
                    if c.watchdog.disarm() {
                        debug!("Recovery watchdog disarmed on foreground");
                    }
                    c.reconcile_transport();
                }
                Visibility::Hidden => {
                    if c.state.is_playing {
                        debug!("Arming recovery watchdog");
                        c.watchdog.arm(now);
                    }
                }
            }
        });
    }

    /// Bring intent and device transport back in agreement after foregrounding
    fn reconcile_transport(&mut self) {
        if self.state.current_track().is_none() {
            return;
        }

        let device_paused = self.device.is_paused();
        if self.state.is_playing && device_paused {
            info!("Device paused while in background, resuming");
            self.request_play();
        } else if !self.state.is_playing && !device_paused {
            // The device is audibly playing; follow it rather than cutting audio
            debug!("Device playing against paused intent, adopting device state");
            self.set_playing(true);
        }
    }

    /// Timer tick for the recovery watchdog
    pub fn on_tick(&mut self, now: Instant) {
        self.transition(|c| match c.watchdog.tick(now) {
            WatchdogTick::Idle => {}
            WatchdogTick::Expired => debug!("Recovery watchdog expired"),
            WatchdogTick::Poll => {
                if !c.state.is_playing {
                    c.watchdog.disarm();
                    return;
                }
                if c.device.is_paused() && c.state.current_track().is_some() {
                    let position = c.resume_position();
                    info!("Device suspended by host, resuming at {:.1}s", position);
                    c.device.set_current_time(position);
                    c.request_play();
                    c.pending_events.push(PlaybackEvent::PlaybackRecovered {
                        position_seconds: position,
                    });
                }
            }
        });
    }

    /// Where to resume a suspended device
    ///
    /// The device playhead when it still has one, else the last reported
    /// progress.
    fn resume_position(&self) -> f64 {
        let playhead = self.device.current_time();
        if playhead.is_finite() && playhead > 0.0 {
            playhead
        } else {
            self.state.position_seconds
        }
    }

    // ===== Control Surface =====

    /// Route a control-surface command through the regular transitions
    pub fn on_surface_command(&mut self, command: SurfaceCommand) {
        debug!("Control surface command: {:?}", command);
        match command {
            SurfaceCommand::Play => self.play(),
            SurfaceCommand::Pause => {
                if self.state.is_playing {
                    self.toggle_play_pause();
                }
            }
            SurfaceCommand::NextTrack => self.next(),
            SurfaceCommand::PreviousTrack => self.previous(),
        }
    }

    // ===== Lifecycle =====

    /// Detach listeners and cancel the watchdog
    ///
    /// Idempotent; the surface is detached exactly once. Later calls to
    /// [`handle`](Self::handle) fail with [`PlaybackError::Disposed`].
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.watchdog.disarm();
        self.surface.detach();
        debug!("Playback controller disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ===== State Queries =====

    /// Immutable view of the current state
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.state.snapshot(self.watchdog.is_armed())
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.state.current_track()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.current_index
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_watchdog_armed(&self) -> bool {
        self.watchdog.is_armed()
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internal =====

    /// Run one transition, then mirror the result to the control surface
    fn transition(&mut self, apply: impl FnOnce(&mut Self)) {
        apply(self);
        let is_playing = self.state.is_playing;
        self.surface.sync(self.state.current_track(), is_playing);
    }

    /// Set intent to playing and ask the device to play
    fn start_playback(&mut self) {
        if self.state.current_track().is_none() {
            debug!("Play ignored: no track loaded");
            return;
        }
        self.set_playing(true);
        self.request_play();
    }

    /// Ask the device to play; a rejection is logged and the intent kept
    fn request_play(&mut self) {
        if let Err(e) = self.device.play() {
            warn!("Device refused playback: {}", e);
            let message = match e {
                PlaybackError::PlaybackRejected(message) => message,
                other => other.to_string(),
            };
            self.pending_events
                .push(PlaybackEvent::PlaybackRejected { message });
        }
    }

    /// Switch to `index`, or restart when it is already the active track
    fn move_to(&mut self, index: usize) {
        let same_track = self.state.current_index == Some(index)
            && self.state.current_track().map(|t| &t.media_url) == self.loaded_url.as_ref();

        if same_track {
            self.restart_current();
        } else {
            self.state.current_index = Some(index);
            self.load_current();
        }
    }

    /// Load the active track into the device, playing it if intended
    fn load_current(&mut self) {
        let Some(track) = self.state.current_track().cloned() else {
            return;
        };
        let previous_track_id = self.loaded_track_id();

        info!("Loading track {}: {} - {}", track.id, track.artist, track.title);
        self.device.load(&track.media_url);
        self.loaded_url = Some(track.media_url.clone());
        self.state.position_seconds = 0.0;
        self.state.duration_seconds = None;

        self.pending_events.push(PlaybackEvent::TrackChanged {
            index: self.state.current_index.unwrap_or(0),
            track_id: track.id,
            previous_track_id,
        });

        if self.state.is_playing {
            self.request_play();
        }
    }

    /// Rewind the active track and play it if intended
    fn restart_current(&mut self) {
        self.rewind();
        if self.state.is_playing {
            self.request_play();
        }
        if let Some(track) = self.state.current_track() {
            self.pending_events
                .push(PlaybackEvent::TrackRestarted { track_id: track.id });
        }
    }

    fn rewind(&mut self) {
        self.device.set_current_time(0.0);
        self.state.position_seconds = 0.0;
    }

    fn loaded_track_id(&self) -> Option<u32> {
        let url = self.loaded_url.as_ref()?;
        self.state
            .catalog
            .iter()
            .find(|t| &t.media_url == url)
            .map(|t| t.id)
    }

    fn set_playing(&mut self, is_playing: bool) {
        if self.state.is_playing != is_playing {
            self.state.is_playing = is_playing;
            self.pending_events
                .push(PlaybackEvent::StateChanged { is_playing });
        }
    }

    fn set_buffering(&mut self, is_buffering: bool) {
        if self.state.is_buffering != is_buffering {
            self.state.is_buffering = is_buffering;
            self.pending_events
                .push(PlaybackEvent::BufferingChanged { is_buffering });
        }
    }

    fn apply_volume(&mut self) {
        self.device.set_volume(self.state.volume.effective());
    }

    fn emit_volume_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::VolumeChanged {
            level: self.state.volume.level(),
            is_muted: self.state.volume.is_muted(),
        });
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.dispose();
    }
}
