//! Background grid-transition monitor.
//!
//! Every cycle resolves the device, fetches a reading, classifies it and
//! compares the result with the previous classification. Only two edges are
//! alert-worthy: `GridOff -> GridOn` and `GridOn -> GridOff`. The first
//! successful reading only seeds the state. A failed cycle is skipped and
//! leaves the state untouched.
//!
//! The cycle logic is the pure function [`step`]; [`TransitionMonitor`] adds
//! I/O, the sleep between cycles and the enabled flag.

use std::sync::Arc;
use std::time::Duration;

use ecoflow_api::{Reading, ReadingOutcome, StationSource};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::dispatch::{DispatchReport, Dispatcher};
use crate::power::PowerState;
use crate::render;

/// Default pause between cycles.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Last classification seen by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorState {
    /// No successful reading yet. Never re-entered.
    #[default]
    Unknown,
    Known(PowerState),
}

impl MonitorState {
    pub fn power_state(&self) -> Option<PowerState> {
        match self {
            MonitorState::Unknown => None,
            MonitorState::Known(state) => Some(*state),
        }
    }
}

/// Direction of an alert-worthy transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// `GridOff -> GridOn`.
    GridOn,
    /// `GridOn -> GridOff`.
    GridOff,
}

/// A transition to announce, with the reading that triggered it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub reading: Reading,
}

/// Advance the state machine by one successful reading.
pub fn step(previous: MonitorState, reading: &Reading) -> (MonitorState, Option<Alert>) {
    let current = PowerState::of(reading);

    let kind = match (previous, current) {
        (MonitorState::Known(PowerState::GridOff), PowerState::GridOn) => Some(AlertKind::GridOn),
        (MonitorState::Known(PowerState::GridOn), PowerState::GridOff) => Some(AlertKind::GridOff),
        _ => None,
    };

    let alert = kind.map(|kind| Alert {
        kind,
        reading: *reading,
    });
    (MonitorState::Known(current), alert)
}

/// Why a cycle produced no classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    DeviceNotFound,
    Unreachable(String),
    ApiFailure(String),
}

/// Result of one monitor cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Cycle {
    Skipped(SkipReason),
    Observed {
        state: PowerState,
        alert: Option<Alert>,
        dispatch: Option<DispatchReport>,
    },
}

/// Controls a running monitor.
#[derive(Debug)]
pub struct MonitorHandle {
    enabled: watch::Sender<bool>,
}

impl MonitorHandle {
    /// Clear the enabled flag. The loop exits at its next wake-up.
    pub fn stop(&self) {
        self.enabled.send_replace(false);
    }

    pub fn is_enabled(&self) -> bool {
        *self.enabled.borrow()
    }
}

/// Polls the station and alerts allow-listed users on grid transitions.
pub struct TransitionMonitor {
    source: Arc<dyn StationSource>,
    dispatcher: Dispatcher,
    interval: Duration,
    state: MonitorState,
    enabled: watch::Receiver<bool>,
}

impl TransitionMonitor {
    /// Create a monitor and the handle that can stop it.
    pub fn new(
        source: Arc<dyn StationSource>,
        dispatcher: Dispatcher,
        interval: Duration,
    ) -> (Self, MonitorHandle) {
        let (tx, rx) = watch::channel(true);
        let monitor = Self {
            source,
            dispatcher,
            interval,
            state: MonitorState::Unknown,
            enabled: rx,
        };
        (monitor, MonitorHandle { enabled: tx })
    }

    /// The last classification.
    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one cycle: fetch, classify, alert if needed.
    pub async fn poll_once(&mut self) -> Cycle {
        let device = match self.source.resolve_device_id().await {
            Ok(Some(device)) => device,
            Ok(None) => return Cycle::Skipped(SkipReason::DeviceNotFound),
            Err(e) => return Cycle::Skipped(SkipReason::Unreachable(e.to_string())),
        };

        let reading = match self.source.fetch_reading(&device).await {
            Ok(ReadingOutcome::Success(reading)) => reading,
            Ok(ReadingOutcome::Failed(failure)) => {
                return Cycle::Skipped(SkipReason::ApiFailure(failure.to_string()))
            }
            Err(e) => return Cycle::Skipped(SkipReason::Unreachable(e.to_string())),
        };

        let previous = self.state;
        let (next, alert) = step(previous, &reading);
        self.state = next;

        let current = PowerState::of(&reading);
        if previous != next {
            debug!(from = ?previous.power_state(), to = %current, "Power state changed");
        }

        let dispatch = match &alert {
            Some(alert) => {
                info!(kind = ?alert.kind, soc = reading.battery_soc, grid_in = reading.grid_in_power, load_out = reading.load_out_power, "Grid transition");
                Some(self.dispatcher.broadcast(&render::alert(alert)).await)
            }
            None => None,
        };

        Cycle::Observed {
            state: current,
            alert,
            dispatch,
        }
    }

    /// Poll until the enabled flag is cleared.
    ///
    /// The interval is constant: failed cycles are not retried early and no
    /// back-off is applied.
    pub async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "Starting power monitor");

        while *self.enabled.borrow() {
            match self.poll_once().await {
                Cycle::Skipped(reason) => {
                    warn!(reason = ?reason, "Monitor cycle skipped");
                }
                Cycle::Observed { state, .. } => {
                    debug!(state = %state, "Monitor cycle complete");
                }
            }

            self.pause().await;
        }

        info!("Power monitor stopped");
    }

    /// Spawn [`run`](Self::run) on the tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Sleep for one interval, waking early if the flag changes.
    async fn pause(&mut self) {
        let delay = sleep(self.interval);
        tokio::pin!(delay);

        tokio::select! {
            _ = &mut delay => {}
            changed = self.enabled.changed() => {
                if changed.is_err() {
                    // Handle dropped: the flag can no longer change.
                    delay.await;
                }
            }
        }
    }
}
