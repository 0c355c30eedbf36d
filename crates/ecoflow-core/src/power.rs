//! Power-state classification.

use std::fmt;

use ecoflow_api::Reading;
use serde::Serialize;

/// Grid input above this many watts means the grid is up.
pub const GRID_THRESHOLD_WATTS: f64 = 10.0;

/// Simplified state of the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    /// The grid is feeding the station.
    GridOn,
    /// No grid input and the battery is carrying a load.
    GridOff,
    /// Neither of the above (asleep, nothing plugged in, or exactly at threshold).
    Idle,
}

impl PowerState {
    /// Classify a reading. Only grid input and load output are considered.
    pub fn of(reading: &Reading) -> Self {
        classify(reading.grid_in_power, reading.load_out_power)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerState::GridOn => "grid_on",
            PowerState::GridOff => "grid_off",
            PowerState::Idle => "idle",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map grid input and load output (watts) to a [`PowerState`].
///
/// Both comparisons are strict: a grid input of exactly 10 W is `Idle`
/// whatever the load.
pub fn classify(grid_in_power: f64, load_out_power: f64) -> PowerState {
    if grid_in_power > GRID_THRESHOLD_WATTS {
        PowerState::GridOn
    } else if grid_in_power < GRID_THRESHOLD_WATTS && load_out_power > 0.0 {
        PowerState::GridOff
    } else {
        PowerState::Idle
    }
}
