//! Core types for playback control

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Track descriptor
///
/// Immutable once handed to the controller. The catalog provider owns the
/// list; the controller only holds a shared snapshot of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Catalog-assigned identifier
    pub id: u32,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Album name
    pub album: String,

    /// Duration hint in seconds (0 when unknown until the device reports it)
    #[serde(rename = "duration", default)]
    pub duration_hint: u32,

    /// Cover image URL
    #[serde(rename = "cover")]
    pub cover_url: String,

    /// Playable media URL
    #[serde(rename = "src")]
    pub media_url: String,
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop at the end of the playlist
    #[default]
    None,

    /// Loop the whole playlist
    All,

    /// Loop the current track
    One,
}

impl RepeatMode {
    /// Next mode in the `none -> all -> one -> none` cycle
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::None => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::None,
        }
    }
}

/// Foreground/background state of the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Playback configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Initial volume (0.0-1.0, default: 0.7)
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Initial shuffle flag (default: false)
    #[serde(default)]
    pub shuffle: bool,

    /// Initial repeat mode (default: none)
    #[serde(default)]
    pub repeat: RepeatMode,

    /// Position after which "previous" restarts the current track (default: 3s)
    #[serde(default = "default_restart_threshold", with = "duration_secs")]
    pub restart_threshold: Duration,

    /// Poll interval of the background recovery watchdog (default: 1s)
    #[serde(default = "default_watchdog_interval", with = "duration_secs")]
    pub watchdog_interval: Duration,

    /// Lifetime ceiling of the background recovery watchdog (default: 30s)
    #[serde(default = "default_watchdog_ceiling", with = "duration_secs")]
    pub watchdog_ceiling: Duration,
}

impl PlaybackConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(PlaybackError::Config(format!(
                "volume must be within 0.0-1.0, got {}",
                self.volume
            )));
        }

        if self.watchdog_interval.is_zero() {
            return Err(PlaybackError::Config(
                "watchdog_interval must be greater than zero".to_string(),
            ));
        }

        if self.watchdog_ceiling < self.watchdog_interval {
            return Err(PlaybackError::Config(format!(
                "watchdog_ceiling ({:?}) is shorter than watchdog_interval ({:?})",
                self.watchdog_ceiling, self.watchdog_interval
            )));
        }

        Ok(())
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            shuffle: false,
            repeat: RepeatMode::None,
            restart_threshold: default_restart_threshold(),
            watchdog_interval: default_watchdog_interval(),
            watchdog_ceiling: default_watchdog_ceiling(),
        }
    }
}

fn default_volume() -> f32 {
    0.7
}

fn default_restart_threshold() -> Duration {
    Duration::from_secs(3)
}

fn default_watchdog_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_watchdog_ceiling() -> Duration {
    Duration::from_secs(30)
}

/// Durations in config files are plain (fractional) seconds
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(serde::de::Error::custom(format!(
                "expected a non-negative number of seconds, got {secs}"
            )));
        }
        Ok(Duration::from_secs_f64(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.volume, 0.7);
        assert!(!config.shuffle);
        assert_eq!(config.repeat, RepeatMode::None);
        assert_eq!(config.restart_threshold, Duration::from_secs(3));
        assert_eq!(config.watchdog_interval, Duration::from_secs(1));
        assert_eq!(config.watchdog_ceiling, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn repeat_mode_cycles() {
        assert_eq!(RepeatMode::None.cycle(), RepeatMode::All);
        assert_eq!(RepeatMode::All.cycle(), RepeatMode::One);
        assert_eq!(RepeatMode::One.cycle(), RepeatMode::None);
    }

    #[test]
    fn config_rejects_bad_values() {
        let config = PlaybackConfig {
            volume: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PlaybackError::Config(_))));

        let config = PlaybackConfig {
            watchdog_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PlaybackConfig {
            watchdog_interval: Duration::from_secs(5),
            watchdog_ceiling: Duration::from_secs(2),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_deserializes_seconds() {
        let json = r#"{"volume": 0.5, "repeat": "all", "watchdog_interval": 0.5}"#;
        let config: PlaybackConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.volume, 0.5);
        assert_eq!(config.repeat, RepeatMode::All);
        assert_eq!(config.watchdog_interval, Duration::from_millis(500));
        assert_eq!(config.watchdog_ceiling, Duration::from_secs(30));
    }

    #[test]
    fn track_uses_listing_field_names() {
        let json = r#"{
            "id": 1,
            "title": "Midnight Dreams",
            "artist": "Strawberry Studios",
            "album": "Night Sessions",
            "duration": 245,
            "cover": "https://example.com/cover.jpg",
            "src": "https://example.com/song.mp3"
        }"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.duration_hint, 245);
        assert_eq!(track.media_url, "https://example.com/song.mp3");
    }
}
