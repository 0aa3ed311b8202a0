//! Interactive player loop
//!
//! Wires the playback controller to the simulated device, the terminal
//! control surface, the configured catalog provider and a line-based key
//! reader.

use crate::config::CliConfig;
use crate::keys::{self, KeyAction};
use crate::provider::provider_for;
use crate::sim_device::{SimulatedClock, SimulatedDevice};
use crate::surface::LogSurface;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use strawberry_playback::catalog::format_duration;
use strawberry_playback::{
    load_catalog, CatalogLoad, CatalogProvider, ControllerEvent, ControllerHandle,
    PlaybackController, PlaybackEvent, PlaybackSnapshot, RepeatMode, UserIntent, Visibility,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, warn};

/// Resolve the configured catalog, applying the fallback rule
pub async fn resolve_catalog(config: &CliConfig) -> anyhow::Result<CatalogLoad> {
    match configured_provider(config)? {
        Some(provider) => Ok(load_catalog(provider.as_ref()).await),
        None => Ok(CatalogLoad::fallback(None)),
    }
}

fn configured_provider(config: &CliConfig) -> anyhow::Result<Option<Arc<dyn CatalogProvider>>> {
    let timeout = Duration::from_secs(config.catalog.request_timeout_secs);
    config
        .catalog
        .source
        .as_deref()
        .map(|source| provider_for(source, timeout))
        .transpose()
        .context("Invalid catalog source")
}

/// Run the player until `input` ends or asks to quit
///
/// Returns the last published snapshot.
pub async fn run<R>(config: CliConfig, input: R) -> anyhow::Result<PlaybackSnapshot>
where
    R: AsyncBufRead + Unpin,
{
    let provider = configured_provider(&config)?;

    let (device, clock) = SimulatedDevice::new(config.device.default_track_seconds);
    let controller = PlaybackController::with_surface(
        config.playback.clone(),
        Box::new(device),
        Box::new(LogSurface::new()),
    );
    clock.learn_durations(&controller.snapshot().catalog);

    let handle = ControllerHandle::spawn(controller, config.playback.watchdog_interval);
    let mut snapshots = handle.subscribe();

    if let Some(provider) = &provider {
        handle.refresh_catalog(Arc::clone(provider));
    }

    let clock_task = tokio::spawn(drive_clock(
        clock.clone(),
        handle.sender(),
        handle.subscribe(),
        Duration::from_millis(config.device.progress_interval_ms),
        config.device.time_scale,
    ));
    let events_task = tokio::spawn(log_events(handle.subscribe_events()));

    info!("Player ready, press ? for help");

    // Only the keyboard changes volume
    let mut volume = config.playback.volume;

    let mut lines = input.lines();
    'input: while let Some(line) = lines.next_line().await? {
        for action in keys::parse_line(&line) {
            match action {
                KeyAction::Intent(intent) => handle.send(intent).await?,
                KeyAction::VolumeStep(delta) => {
                    volume = (volume + delta).clamp(0.0, 1.0);
                    handle.send(UserIntent::SetVolume { level: volume }).await?;
                }
                KeyAction::Visibility(visibility) => {
                    handle.send(visibility).await?;
                    if visibility == Visibility::Hidden && config.device.suspend_in_background {
                        clock.suspend();
                    }
                }
                KeyAction::RefreshCatalog => match &provider {
                    Some(provider) => {
                        handle.refresh_catalog(Arc::clone(provider));
                    }
                    None => info!("No catalog source configured"),
                },
                KeyAction::Status => println!("{}", format_status(&handle.snapshot())),
                KeyAction::Help => println!("{}", keys::HELP),
                KeyAction::Quit => break 'input,
            }
        }
    }

    clock_task.abort();
    handle.shutdown().await;
    events_task.abort();

    let snapshot = snapshots.borrow_and_update().clone();
    Ok(snapshot)
}

/// Feed simulated device progress into the controller
async fn drive_clock(
    clock: SimulatedClock,
    sender: mpsc::Sender<ControllerEvent>,
    snapshots: watch::Receiver<PlaybackSnapshot>,
    interval: Duration,
    time_scale: f64,
) {
    let mut ticker = tokio::time::interval(interval);
    let mut known_catalog = Arc::clone(&snapshots.borrow().catalog);
    let step = interval.as_secs_f64() * time_scale;

    loop {
        ticker.tick().await;

        {
            let snapshot = snapshots.borrow();
            if !Arc::ptr_eq(&snapshot.catalog, &known_catalog) {
                clock.learn_durations(&snapshot.catalog);
                known_catalog = Arc::clone(&snapshot.catalog);
            }
        }

        for notification in clock.advance(step) {
            if sender.send(notification.into()).await.is_err() {
                debug!("Controller stopped, simulated clock exiting");
                return;
            }
        }
    }
}

/// Log controller events worth telling the user about
async fn log_events(mut events: broadcast::Receiver<PlaybackEvent>) {
    loop {
        match events.recv().await {
            Ok(PlaybackEvent::CatalogReplaced {
                length,
                using_fallback,
            }) => {
                if using_fallback {
                    warn!("Using fallback tracks ({} tracks)", length);
                } else {
                    info!("Catalog loaded: {} tracks", length);
                }
            }
            Ok(PlaybackEvent::PlaylistEnded) => info!("End of playlist"),
            Ok(PlaybackEvent::PlaybackRejected { message }) => {
                warn!("Playback failed: {}. Press space to retry", message);
            }
            Ok(PlaybackEvent::PlaybackRecovered { position_seconds }) => {
                info!(
                    "Resumed suspended playback at {}",
                    format_duration(position_seconds)
                );
            }
            Ok(PlaybackEvent::RepeatChanged { mode }) => info!("Repeat: {}", repeat_label(mode)),
            Ok(PlaybackEvent::ShuffleChanged { is_shuffled }) => {
                info!("Shuffle: {}", if is_shuffled { "on" } else { "off" });
            }
            Ok(other) => debug!("{:?}", other),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!("Event log skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn repeat_label(mode: RepeatMode) -> &'static str {
    match mode {
        RepeatMode::None => "off",
        RepeatMode::All => "all",
        RepeatMode::One => "one",
    }
}

/// One-line status for the terminal
pub fn format_status(snapshot: &PlaybackSnapshot) -> String {
    let Some(track) = &snapshot.current_track else {
        return "No tracks".to_string();
    };

    let position = format_duration(snapshot.position_seconds);
    let duration = snapshot
        .duration_seconds
        .map_or_else(|| "-:--".to_string(), format_duration);
    let volume = if snapshot.is_muted {
        "muted".to_string()
    } else {
        format!("{:.0}%", snapshot.volume * 100.0)
    };

    let mut status = format!(
        "[{}] {}/{} {} - {} {} / {} | vol {} | shuffle {} | repeat {}",
        if snapshot.is_playing { "playing" } else { "paused" },
        snapshot.current_index.map_or(0, |i| i + 1),
        snapshot.catalog.len(),
        track.artist,
        track.title,
        position,
        duration,
        volume,
        if snapshot.is_shuffled { "on" } else { "off" },
        repeat_label(snapshot.repeat_mode),
    );

    if snapshot.is_buffering {
        status.push_str(" | buffering");
    }
    if snapshot.catalog_unavailable {
        status.push_str(" | offline catalog");
    }
    status
}
