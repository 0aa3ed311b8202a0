//! Shared test doubles for controller integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use strawberry_playback::{
    ControlSurface, MediaDevice, NowPlayingMetadata, PlaybackConfig, PlaybackController,
    PlaybackError, Result, SurfacePlaybackState, Track,
};

// ===== Fake Media Device =====

/// Command issued to the fake device
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    Load(String),
    Play,
    Pause,
    Seek(f64),
    Volume(f32),
}

#[derive(Debug)]
pub struct DeviceState {
    pub commands: Vec<DeviceCommand>,
    pub paused: bool,
    pub position: f64,
    pub volume: f32,
    pub reject_play: bool,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            paused: true,
            position: 0.0,
            volume: 1.0,
            reject_play: false,
        }
    }
}

/// In-memory media device recording every command
#[derive(Clone, Default)]
pub struct FakeDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<DeviceCommand> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.state.lock().unwrap().commands.clear();
    }

    pub fn play_count(&self) -> usize {
        self.commands()
            .iter()
            .filter(|c| **c == DeviceCommand::Play)
            .count()
    }

    pub fn loads(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                DeviceCommand::Load(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().unwrap().paused
    }

    pub fn position(&self) -> f64 {
        self.state.lock().unwrap().position
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().unwrap().volume
    }

    /// Simulate the host suspending output behind the controller's back
    pub fn suspend(&self) {
        self.state.lock().unwrap().paused = true;
    }

    /// Move the playhead without recording a command, as decoding does
    pub fn set_playhead(&self, seconds: f64) {
        self.state.lock().unwrap().position = seconds;
    }

    /// Simulate output starting without the controller asking
    pub fn force_playing(&self) {
        self.state.lock().unwrap().paused = false;
    }

    pub fn set_reject_play(&self, reject: bool) {
        self.state.lock().unwrap().reject_play = reject;
    }
}

impl MediaDevice for FakeDevice {
    fn load(&mut self, url: &str) {
        let mut state = self.state.lock().unwrap();
        state.commands.push(DeviceCommand::Load(url.to_string()));
        state.paused = true;
        state.position = 0.0;
    }

    fn play(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.commands.push(DeviceCommand::Play);
        if state.reject_play {
            return Err(PlaybackError::PlaybackRejected(
                "play() request was denied by autoplay policy".to_string(),
            ));
        }
        state.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.commands.push(DeviceCommand::Pause);
        state.paused = true;
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut state = self.state.lock().unwrap();
        state.commands.push(DeviceCommand::Seek(seconds));
        state.position = seconds;
    }

    fn set_volume(&mut self, level: f32) {
        let mut state = self.state.lock().unwrap();
        state.commands.push(DeviceCommand::Volume(level));
        state.volume = level;
    }

    fn is_paused(&self) -> bool {
        self.state.lock().unwrap().paused
    }

    fn current_time(&self) -> f64 {
        self.state.lock().unwrap().position
    }
}

// ===== Fake Control Surface =====

#[derive(Debug, Default)]
pub struct SurfaceState {
    pub metadata: Vec<NowPlayingMetadata>,
    pub states: Vec<SurfacePlaybackState>,
    pub attach_calls: usize,
    pub detach_calls: usize,
}

/// Control surface recording what the controller mirrored
#[derive(Clone, Default)]
pub struct FakeSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metadata(&self) -> Vec<NowPlayingMetadata> {
        self.state.lock().unwrap().metadata.clone()
    }

    pub fn last_state(&self) -> Option<SurfacePlaybackState> {
        self.state.lock().unwrap().states.last().copied()
    }

    pub fn attach_calls(&self) -> usize {
        self.state.lock().unwrap().attach_calls
    }

    pub fn detach_calls(&self) -> usize {
        self.state.lock().unwrap().detach_calls
    }
}

impl ControlSurface for FakeSurface {
    fn attach(&mut self) {
        self.state.lock().unwrap().attach_calls += 1;
    }

    fn detach(&mut self) {
        self.state.lock().unwrap().detach_calls += 1;
    }

    fn set_metadata(&mut self, metadata: &NowPlayingMetadata) {
        self.state.lock().unwrap().metadata.push(metadata.clone());
    }

    fn set_playback_state(&mut self, state: SurfacePlaybackState) {
        self.state.lock().unwrap().states.push(state);
    }
}

// ===== Builders =====

pub fn track(id: u32) -> Track {
    Track {
        id,
        title: format!("Track {}", id),
        artist: format!("Artist {}", id),
        album: "Test Album".to_string(),
        duration_hint: 180,
        cover_url: format!("https://covers.test/{}.jpg", id),
        media_url: format!("https://media.test/{}.mp3", id),
    }
}

pub fn tracks(count: u32) -> Vec<Track> {
    (1..=count).map(track).collect()
}

/// Controller over a fake device, fallback catalog loaded
pub fn controller() -> (PlaybackController, FakeDevice) {
    let device = FakeDevice::new();
    let controller = PlaybackController::new(PlaybackConfig::default(), Box::new(device.clone()));
    (controller, device)
}

/// Controller over a fake device and surface with `count` test tracks
pub fn controller_with_tracks(count: u32) -> (PlaybackController, FakeDevice, FakeSurface) {
    let device = FakeDevice::new();
    let surface = FakeSurface::new();
    let mut controller = PlaybackController::with_surface(
        PlaybackConfig::default(),
        Box::new(device.clone()),
        Box::new(surface.clone()),
    );
    controller.on_catalog_replaced(tracks(count));
    controller.drain_events();
    device.clear_commands();
    (controller, device, surface)
}
