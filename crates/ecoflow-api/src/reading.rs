//! Station readings and device identity.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Quota key for battery state of charge (percent).
pub const SOC_KEY: &str = "cmsBattSoc";
/// Quota key for power drawn from the grid (watts).
pub const GRID_IN_KEY: &str = "powGetSysGrid";
/// Quota key for power delivered to the load (watts).
pub const LOAD_OUT_KEY: &str = "powGetSysLoad";

/// Serial number of a station.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(sn: impl Into<String>) -> Self {
        Self(sn.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(sn: &str) -> Self {
        Self::new(sn)
    }
}

/// One snapshot of the station's power metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    /// Battery charge in percent.
    pub battery_soc: i64,
    /// Watts coming in from the grid.
    pub grid_in_power: f64,
    /// Watts going out to the load.
    pub load_out_power: f64,
}

impl Reading {
    pub fn new(battery_soc: i64, grid_in_power: f64, load_out_power: f64) -> Self {
        Self {
            battery_soc,
            grid_in_power,
            load_out_power,
        }
    }

    /// Map the quota object to a reading. Absent or non-numeric keys read as zero.
    pub fn from_quota(quota: &Map<String, Value>) -> Self {
        let number = |key: &str| quota.get(key).and_then(Value::as_f64).unwrap_or(0.0);

        let battery_soc = quota
            .get(SOC_KEY)
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f.round() as i64)))
            .unwrap_or(0);

        Self {
            battery_soc,
            grid_in_power: number(GRID_IN_KEY),
            load_out_power: number(LOAD_OUT_KEY),
        }
    }
}

/// An answer from the API whose `code` was not the success sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiFailure {
    /// The `code` field as text.
    pub code: String,
    /// The `message` field, when present.
    pub message: Option<String>,
    /// The full response body.
    pub payload: Value,
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "code {}: {}", self.code, message),
            None => write!(f, "code {}", self.code),
        }
    }
}

/// Result of a quota fetch that reached the API.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadingOutcome {
    Success(Reading),
    Failed(ApiFailure),
}

impl ReadingOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ReadingOutcome::Success(_))
    }

    pub fn reading(&self) -> Option<&Reading> {
        match self {
            ReadingOutcome::Success(reading) => Some(reading),
            ReadingOutcome::Failed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quota(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_from_quota_maps_known_keys() {
        let reading = Reading::from_quota(&quota(json!({
            "cmsBattSoc": 80,
            "powGetSysGrid": 15.5,
            "powGetSysLoad": 0,
            "unrelated": "ignored"
        })));

        assert_eq!(reading, Reading::new(80, 15.5, 0.0));
    }

    #[test]
    fn test_from_quota_defaults_missing_keys_to_zero() {
        let reading = Reading::from_quota(&quota(json!({ "powGetSysLoad": 120 })));
        assert_eq!(reading, Reading::new(0, 0.0, 120.0));

        let empty = Reading::from_quota(&Map::new());
        assert_eq!(empty, Reading::new(0, 0.0, 0.0));
    }

    #[test]
    fn test_from_quota_rounds_fractional_soc() {
        let reading = Reading::from_quota(&quota(json!({ "cmsBattSoc": 79.6 })));
        assert_eq!(reading.battery_soc, 80);
    }

    #[test]
    fn test_api_failure_display() {
        let failure = ApiFailure {
            code: "8521".to_string(),
            message: Some("signature is wrong".to_string()),
            payload: json!({}),
        };
        assert_eq!(failure.to_string(), "code 8521: signature is wrong");
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = ReadingOutcome::Success(Reading::new(50, 0.0, 10.0));
        assert!(ok.is_success());
        assert_eq!(ok.reading().map(|r| r.battery_soc), Some(50));

        let failed = ReadingOutcome::Failed(ApiFailure {
            code: "1".to_string(),
            message: None,
            payload: Value::Null,
        });
        assert!(!failed.is_success());
        assert!(failed.reading().is_none());
    }
}
