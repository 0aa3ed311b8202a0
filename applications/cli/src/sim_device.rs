//! Simulated media output device
//!
//! Stands in for a real decoder: "plays" by advancing a clock and reports the
//! same notifications a browser media element would. The controller owns the
//! [`SimulatedDevice`]; the CLI keeps a [`SimulatedClock`] sharing the same
//! state and drives it from a timer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use strawberry_playback::{DeviceNotification, MediaDevice, PlaybackError, Result, Track};
use tracing::debug;

#[derive(Debug)]
struct SimState {
    durations: HashMap<String, f64>,
    default_duration: f64,
    url: Option<String>,
    duration: f64,
    position: f64,
    paused: bool,
    volume: f32,
    metadata_pending: bool,
    seeked: bool,
}

impl SimState {
    fn new(default_duration: f64) -> Self {
        Self {
            durations: HashMap::new(),
            default_duration,
            url: None,
            duration: default_duration,
            position: 0.0,
            paused: true,
            volume: 1.0,
            metadata_pending: false,
            seeked: false,
        }
    }
}

fn lock(state: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    // A panic while holding the lock leaves plain data behind; keep going
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Media device backed by a simulated clock
#[derive(Debug)]
pub struct SimulatedDevice {
    state: Arc<Mutex<SimState>>,
}

/// Clock side of a [`SimulatedDevice`]
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedDevice {
    /// Create a device and its clock
    ///
    /// `default_duration` applies to media with no known duration hint.
    pub fn new(default_duration: f64) -> (Self, SimulatedClock) {
        let state = Arc::new(Mutex::new(SimState::new(default_duration)));
        (
            Self {
                state: Arc::clone(&state),
            },
            SimulatedClock { state },
        )
    }
}

impl MediaDevice for SimulatedDevice {
    fn load(&mut self, url: &str) {
        let mut state = lock(&self.state);
        state.duration = state.default_duration;
        state.url = Some(url.to_string());
        state.position = 0.0;
        state.paused = true;
        state.metadata_pending = true;
        debug!(url, "Simulated device loaded media");
    }

    fn play(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        if state.url.is_none() {
            return Err(PlaybackError::PlaybackRejected(
                "no media loaded".to_string(),
            ));
        }
        state.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        lock(&self.state).paused = true;
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut state = lock(&self.state);
        state.position = seconds.clamp(0.0, state.duration);
        state.seeked = true;
    }

    fn set_volume(&mut self, level: f32) {
        lock(&self.state).volume = level;
    }

    fn is_paused(&self) -> bool {
        lock(&self.state).paused
    }

    fn current_time(&self) -> f64 {
        lock(&self.state).position
    }
}

impl SimulatedClock {
    /// Learn media durations from a catalog
    ///
    /// Tracks without a duration hint fall back to the default duration.
    /// Applies to media whose metadata has not been reported yet.
    pub fn learn_durations(&self, tracks: &[Track]) {
        let mut state = lock(&self.state);
        state.durations = tracks
            .iter()
            .filter(|t| t.duration_hint > 0)
            .map(|t| (t.media_url.clone(), f64::from(t.duration_hint)))
            .collect();
    }

    /// Advance simulated time by `seconds` and collect notifications
    pub fn advance(&self, seconds: f64) -> Vec<DeviceNotification> {
        let mut state = lock(&self.state);
        let mut notifications = Vec::new();

        if state.url.is_none() {
            return notifications;
        }

        if state.metadata_pending {
            // Resolved here so durations learned after the load still apply
            state.metadata_pending = false;
            let duration = state
                .url
                .as_ref()
                .and_then(|url| state.durations.get(url))
                .copied()
                .unwrap_or(state.default_duration);
            state.duration = duration;
            notifications.push(DeviceNotification::LoadedMetadata {
                duration: state.duration,
            });
            notifications.push(DeviceNotification::CanPlay);
        }

        if state.paused {
            if std::mem::take(&mut state.seeked) {
                notifications.push(DeviceNotification::TimeUpdate {
                    seconds: state.position,
                });
            }
            return notifications;
        }

        state.seeked = false;
        state.position = (state.position + seconds.max(0.0)).min(state.duration);
        notifications.push(DeviceNotification::TimeUpdate {
            seconds: state.position,
        });

        if state.position >= state.duration {
            state.paused = true;
            notifications.push(DeviceNotification::Ended);
        }

        notifications
    }

    /// Pause output behind the controller's back, as a host suspending a
    /// backgrounded app would
    pub fn suspend(&self) {
        let mut state = lock(&self.state);
        if !state.paused {
            debug!("Simulated host suspended audio output");
            state.paused = true;
        }
    }

    pub fn is_paused(&self) -> bool {
        lock(&self.state).paused
    }

    pub fn position(&self) -> f64 {
        lock(&self.state).position
    }

    pub fn volume(&self) -> f32 {
        lock(&self.state).volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(url: &str, duration: u32) -> Track {
        Track {
            id: 1,
            title: "Test".to_string(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            duration_hint: duration,
            cover_url: String::new(),
            media_url: url.to_string(),
        }
    }

    #[test]
    fn test_load_reports_metadata_once() {
        let (mut device, clock) = SimulatedDevice::new(30.0);
        clock.learn_durations(&[track("a.mp3", 120)]);

        device.load("a.mp3");
        let first = clock.advance(0.25);
        assert_eq!(
            first,
            vec![
                DeviceNotification::LoadedMetadata { duration: 120.0 },
                DeviceNotification::CanPlay,
            ]
        );
        assert!(clock.advance(0.25).is_empty());
    }

    #[test]
    fn test_durations_learned_after_load_apply() {
        let (mut device, clock) = SimulatedDevice::new(30.0);

        device.load("late.mp3");
        clock.learn_durations(&[track("late.mp3", 200)]);

        assert_eq!(
            clock.advance(0.0).first(),
            Some(&DeviceNotification::LoadedMetadata { duration: 200.0 })
        );
    }

    #[test]
    fn test_unknown_duration_uses_default() {
        let (mut device, clock) = SimulatedDevice::new(30.0);

        device.load("unknown.mp3");

        assert_eq!(
            clock.advance(0.0).first(),
            Some(&DeviceNotification::LoadedMetadata { duration: 30.0 })
        );
    }

    #[test]
    fn test_playing_advances_and_ends() {
        let (mut device, clock) = SimulatedDevice::new(2.0);
        device.load("a.mp3");
        clock.advance(0.0);
        device.play().unwrap();

        assert_eq!(
            clock.advance(1.5),
            vec![DeviceNotification::TimeUpdate { seconds: 1.5 }]
        );
        assert_eq!(
            clock.advance(1.0),
            vec![
                DeviceNotification::TimeUpdate { seconds: 2.0 },
                DeviceNotification::Ended,
            ]
        );
        assert!(device.is_paused());
    }

    #[test]
    fn test_paused_device_reports_seek() {
        let (mut device, clock) = SimulatedDevice::new(60.0);
        device.load("a.mp3");
        clock.advance(0.0);

        device.set_current_time(12.0);

        assert_eq!(
            clock.advance(1.0),
            vec![DeviceNotification::TimeUpdate { seconds: 12.0 }]
        );
        assert!(clock.advance(1.0).is_empty());
    }

    #[test]
    fn test_play_without_media_is_rejected() {
        let (mut device, _clock) = SimulatedDevice::new(30.0);
        assert!(matches!(
            device.play(),
            Err(PlaybackError::PlaybackRejected(_))
        ));
    }

    #[test]
    fn test_suspend_pauses_output() {
        let (mut device, clock) = SimulatedDevice::new(30.0);
        device.load("a.mp3");
        device.play().unwrap();

        clock.suspend();

        assert!(device.is_paused());
        assert!(clock.is_paused());
    }
}
