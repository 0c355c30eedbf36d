//! Process configuration.
//!
//! # Environment Variables
//!
//! Required:
//! - `EF_ACCESS_KEY`: EcoFlow developer access key
//! - `EF_SECRET_KEY`: EcoFlow developer secret key
//!
//! Optional:
//! - `HOST`: API host (default: `https://api-e.ecoflow.com`)
//! - `ALLOWED_USERS`: comma-separated Telegram user ids (default: open mode)
//! - `CHECK_INTERVAL`: seconds between monitor cycles (default: 60)
//! - `MONITORING_ENABLED`: `false`/`0`/`no`/`off` disables grid alerts (default: on)

use std::fmt;
use std::time::Duration;

use ecoflow_api::DEFAULT_HOST;

use crate::auth::AllowList;
use crate::error::{ConfigError, Result};
use crate::monitor::DEFAULT_CHECK_INTERVAL;

pub const ACCESS_KEY_ENV: &str = "EF_ACCESS_KEY";
pub const SECRET_KEY_ENV: &str = "EF_SECRET_KEY";
pub const HOST_ENV: &str = "HOST";
pub const ALLOWED_USERS_ENV: &str = "ALLOWED_USERS";
pub const CHECK_INTERVAL_ENV: &str = "CHECK_INTERVAL";
pub const MONITORING_ENABLED_ENV: &str = "MONITORING_ENABLED";

/// Settings shared by the monitor, the router and the API client.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub access_key: String,
    pub secret_key: String,
    pub host: String,
    pub allow_list: AllowList,
    pub check_interval: Duration,
    /// Run the background transition monitor.
    pub monitoring: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("host", &self.host)
            .field("allow_list", &self.allow_list)
            .field("check_interval", &self.check_interval)
            .field("monitoring", &self.monitoring)
            .finish()
    }
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let access_key = get(ACCESS_KEY_ENV).ok_or(ConfigError::Missing(ACCESS_KEY_ENV))?;
        let secret_key = get(SECRET_KEY_ENV).ok_or(ConfigError::Missing(SECRET_KEY_ENV))?;
        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let allow_list = get(ALLOWED_USERS_ENV)
            .map(|csv| AllowList::parse(&csv))
            .unwrap_or_default();

        let check_interval = match get(CHECK_INTERVAL_ENV) {
            Some(raw) => parse_interval(&raw)?,
            None => DEFAULT_CHECK_INTERVAL,
        };

        let monitoring = match get(MONITORING_ENABLED_ENV) {
            Some(raw) => parse_flag(MONITORING_ENABLED_ENV, &raw)?,
            None => true,
        };

        Ok(Self {
            access_key,
            secret_key,
            host,
            allow_list,
            check_interval,
            monitoring,
        })
    }

    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitoring = enabled;
        self
    }
}

fn parse_interval(raw: &str) -> Result<Duration> {
    let invalid = |reason: &str| ConfigError::Invalid {
        var: CHECK_INTERVAL_ENV,
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let secs: u64 = raw.parse().map_err(|_| invalid("expected whole seconds"))?;
    if secs == 0 {
        return Err(invalid("must be at least 1 second"));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
