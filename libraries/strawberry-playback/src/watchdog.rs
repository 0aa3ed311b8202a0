//! Background recovery watchdog
//!
//! Hosts may suspend audio output when the application is backgrounded. While
//! armed, the watchdog asks the controller to check the device once per
//! interval, and gives up after a fixed ceiling so no periodic work outlives
//! its purpose.
//!
//! The watchdog owns no timer. The host delivers ticks (with the current
//! instant) through the controller's event queue.

use std::time::{Duration, Instant};

/// Outcome of a watchdog tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WatchdogTick {
    /// Not armed, or interval not yet elapsed
    Idle,

    /// Interval elapsed; check the device
    Poll,

    /// Ceiling reached; the watchdog disarmed itself
    Expired,
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    armed_at: Instant,
    last_poll: Instant,
}

#[derive(Debug, Clone)]
pub(crate) struct RecoveryWatchdog {
    interval: Duration,
    ceiling: Duration,
    armed: Option<Armed>,
}

impl RecoveryWatchdog {
    pub(crate) fn new(interval: Duration, ceiling: Duration) -> Self {
        Self {
            interval,
            ceiling,
            armed: None,
        }
    }

    /// Arm (or re-arm) starting at `now`
    pub(crate) fn arm(&mut self, now: Instant) {
        self.armed = Some(Armed {
            armed_at: now,
            last_poll: now,
        });
    }

    /// Disarm; returns whether it was armed
    pub(crate) fn disarm(&mut self) -> bool {
        self.armed.take().is_some()
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub(crate) fn tick(&mut self, now: Instant) -> WatchdogTick {
        let Some(armed) = self.armed.as_mut() else {
            return WatchdogTick::Idle;
        };

        if now.saturating_duration_since(armed.armed_at) >= self.ceiling {
            self.armed = None;
            return WatchdogTick::Expired;
        }

        if now.saturating_duration_since(armed.last_poll) >= self.interval {
            armed.last_poll = now;
            return WatchdogTick::Poll;
        }

        WatchdogTick::Idle
    }
}
