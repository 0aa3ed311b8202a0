/// CLI configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strawberry_playback::PlaybackConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default = "default_catalog")]
    pub catalog: CatalogSettings,

    #[serde(default = "default_device")]
    pub device: DeviceSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogSettings {
    /// HTTP(S) URL or local JSON file; the fallback catalog is used when unset
    #[serde(default)]
    pub source: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceSettings {
    /// Simulated seconds per wall-clock second
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,

    /// How often the simulated device reports progress
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    /// Duration assumed for tracks without a duration hint
    #[serde(default = "default_track_seconds")]
    pub default_track_seconds: f64,

    /// Pause output when the app goes to background, like a mobile host would
    #[serde(default = "default_suspend_in_background")]
    pub suspend_in_background: bool,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// `path` defaults to `strawberry.toml` in the working directory; a
    /// missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        let config_path = path.map_or_else(|| PathBuf::from("strawberry.toml"), Path::to_path_buf);
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        } else if path.is_some() {
            return Err(CliError::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        // Override with environment variables (e.g. STRAWBERRY_PLAYBACK__VOLUME)
        settings = settings.add_source(
            config::Environment::with_prefix("STRAWBERRY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.playback
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;

        if !(self.device.time_scale.is_finite() && self.device.time_scale > 0.0) {
            return Err(CliError::Config(format!(
                "device.time_scale must be positive, got {}",
                self.device.time_scale
            )));
        }

        if self.device.progress_interval_ms == 0 {
            return Err(CliError::Config(
                "device.progress_interval_ms must be non-zero".to_string(),
            ));
        }

        if !(self.device.default_track_seconds.is_finite() && self.device.default_track_seconds > 0.0)
        {
            return Err(CliError::Config(format!(
                "device.default_track_seconds must be positive, got {}",
                self.device.default_track_seconds
            )));
        }

        Ok(())
    }
}

// Default values
fn default_catalog() -> CatalogSettings {
    CatalogSettings {
        source: None,
        request_timeout_secs: default_request_timeout_secs(),
    }
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_device() -> DeviceSettings {
    DeviceSettings {
        time_scale: default_time_scale(),
        progress_interval_ms: default_progress_interval_ms(),
        default_track_seconds: default_track_seconds(),
        suspend_in_background: default_suspend_in_background(),
    }
}

fn default_time_scale() -> f64 {
    1.0
}

fn default_progress_interval_ms() -> u64 {
    250
}

fn default_track_seconds() -> f64 {
    30.0
}

fn default_suspend_in_background() -> bool {
    true
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            catalog: default_catalog(),
            device: default_device(),
        }
    }
}
