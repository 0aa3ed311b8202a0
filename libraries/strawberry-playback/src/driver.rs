//! Async driver for the playback controller
//!
//! The controller itself is synchronous. The driver gives it a home on a
//! tokio task: every input arrives through one mpsc queue, the recovery
//! watchdog is fed from an interval on the same task that only runs while
//! the watchdog is armed, and observers read snapshots from a watch channel
//! and events from a broadcast channel. One task means transitions never
//! overlap.

use crate::catalog::{load_catalog, CatalogProvider};
use crate::controller::PlaybackController;
use crate::error::{PlaybackError, Result};
use crate::events::{ControllerEvent, PlaybackEvent};
use crate::state::PlaybackSnapshot;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Capacity of the inbound event queue
const EVENT_QUEUE_CAPACITY: usize = 256;

/// Capacity of the outbound event broadcast
const EVENT_BROADCAST_CAPACITY: usize = 64;

/// Handle to a running controller task
pub struct ControllerHandle {
    event_tx: mpsc::Sender<ControllerEvent>,
    snapshot_rx: watch::Receiver<PlaybackSnapshot>,
    events_tx: broadcast::Sender<PlaybackEvent>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ControllerHandle {
    /// Move `controller` onto a new task, ticking the watchdog every `tick`
    pub fn spawn(controller: PlaybackController, tick: Duration) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
        let (events_tx, _) = broadcast::channel(EVENT_BROADCAST_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run_event_loop(
            controller,
            tick,
            event_rx,
            snapshot_tx,
            events_tx.clone(),
            shutdown_rx,
        ));

        Self {
            event_tx,
            snapshot_rx,
            events_tx,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Queue an event for the controller
    ///
    /// Fails with [`PlaybackError::Disposed`] once the task has stopped.
    pub async fn send(&self, event: impl Into<ControllerEvent>) -> Result<()> {
        self.event_tx
            .send(event.into())
            .await
            .map_err(|_| PlaybackError::Disposed)
    }

    /// Sender for producers living on other tasks
    pub fn sender(&self) -> mpsc::Sender<ControllerEvent> {
        self.event_tx.clone()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Watch snapshots as transitions land
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Receive controller events emitted after subscribing
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events_tx.subscribe()
    }

    /// Fetch a catalog in the background and hand the result to the controller
    ///
    /// Failures and empty results become the fallback catalog with the
    /// advisory flag set.
    pub fn refresh_catalog(&self, provider: Arc<dyn CatalogProvider>) -> JoinHandle<()> {
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let load = load_catalog(provider.as_ref()).await;
            if event_tx
                .send(ControllerEvent::CatalogLoaded(load))
                .await
                .is_err()
            {
                debug!("Controller stopped before catalog arrived");
            }
        })
    }

    /// Stop the task and dispose the controller
    ///
    /// Events already queued are handled first.
    pub async fn shutdown(mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Controller task failed: {}", e);
            }
        }
    }
}

impl Drop for ControllerHandle {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}

/// Run the controller until shutdown or until every sender is gone
async fn run_event_loop(
    mut controller: PlaybackController,
    tick: Duration,
    mut event_rx: mpsc::Receiver<ControllerEvent>,
    snapshot_tx: watch::Sender<PlaybackSnapshot>,
    events_tx: broadcast::Sender<PlaybackEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    // Only exists while the watchdog is armed
    let mut ticks: Option<Interval> = None;

    info!("Playback controller started");

    loop {
        // Queued events drain before shutdown is honored
        let event = tokio::select! {
            biased;
            received = event_rx.recv() => match received {
                Some(event) => event,
                None => break,
            },
            instant = next_tick(&mut ticks), if ticks.is_some() => {
                ControllerEvent::Tick(instant.into_std())
            }
            _ = &mut shutdown_rx => break,
        };

        if controller
            .handle_at(event, Instant::now().into_std())
            .is_err()
        {
            break;
        }

        publish(&mut controller, &snapshot_tx, &events_tx);
        sync_ticks(&mut ticks, controller.is_watchdog_armed(), tick);
    }

    controller.dispose();
    info!("Playback controller stopped");
}

/// Start the tick interval when the watchdog arms and drop it when it disarms
fn sync_ticks(ticks: &mut Option<Interval>, armed: bool, period: Duration) {
    match (armed, ticks.is_some()) {
        (true, false) => {
            debug!("Starting watchdog ticks every {:?}", period);
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            *ticks = Some(interval);
        }
        (false, true) => {
            debug!("Stopping watchdog ticks");
            *ticks = None;
        }
        _ => {}
    }
}

async fn next_tick(ticks: &mut Option<Interval>) -> Instant {
    match ticks {
        Some(interval) => interval.tick().await,
        None => std::future::pending().await,
    }
}

/// Push the post-transition snapshot and any queued events to observers
fn publish(
    controller: &mut PlaybackController,
    snapshot_tx: &watch::Sender<PlaybackSnapshot>,
    events_tx: &broadcast::Sender<PlaybackEvent>,
) {
    for event in controller.drain_events() {
        debug!("Playback event: {:?}", event);
        // No subscribers is fine
        let _ = events_tx.send(event);
    }

    let snapshot = controller.snapshot();
    snapshot_tx.send_if_modified(|current| {
        if *current == snapshot {
            false
        } else {
            *current = snapshot;
            true
        }
    });
}
