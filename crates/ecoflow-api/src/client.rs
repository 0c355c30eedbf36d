//! EcoFlow IoT open API client.
//!
//! Two signed endpoints are used:
//! - `GET /iot-open/sign/device/list` to find the station's serial number
//! - `GET /iot-open/sign/device/quota/all?sn=<sn>` for the live metrics
//!
//! Both answer with an envelope `{ "code": "0", "message": ..., "data": ... }`.
//! A `code` other than `"0"` is an API-level failure and is returned as data.
//! Anything that stops us from reading the envelope is an [`ApiError`].

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{ApiError, Result};
use crate::reading::{ApiFailure, DeviceId, Reading, ReadingOutcome};
use crate::signer::Signer;

/// European API host.
pub const DEFAULT_HOST: &str = "https://api-e.ecoflow.com";

const DEVICE_LIST_PATH: &str = "/iot-open/sign/device/list";
const QUOTA_ALL_PATH: &str = "/iot-open/sign/device/quota/all";

/// Success sentinel for the envelope `code` field.
const SUCCESS_CODE: &str = "0";

/// Response envelope shared by all endpoints.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    code: Value,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Value,
}

impl Envelope {
    fn code_text(&self) -> String {
        match &self.code {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    fn is_success(&self) -> bool {
        self.code.as_str() == Some(SUCCESS_CODE)
    }
}

/// One entry of the device list.
#[derive(Debug, Deserialize)]
struct DeviceEntry {
    sn: String,
}

/// Client for the station's cloud API.
#[derive(Debug, Clone)]
pub struct EcoflowClient {
    http: reqwest::Client,
    host: String,
    signer: Signer,
}

impl EcoflowClient {
    /// Create a client for `host` with the given key pair.
    pub fn new(
        host: &str,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self> {
        Self::with_http_client(reqwest::Client::new(), host, Signer::new(access_key, secret_key))
    }

    /// Create a client reusing an existing `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, host: &str, signer: Signer) -> Result<Self> {
        let parsed = Url::parse(host).map_err(|e| ApiError::InvalidHost {
            host: host.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidHost {
                host: host.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            http,
            host: host.trim_end_matches('/').to_string(),
            signer,
        })
    }

    /// The base URL requests are sent to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Return the serial number of the first listed device.
    ///
    /// `Ok(None)` when the API reports failure or lists no devices.
    pub async fn resolve_device_id(&self) -> Result<Option<DeviceId>> {
        let (envelope, _) = self.get(DEVICE_LIST_PATH, &[]).await?;

        if !envelope.is_success() {
            warn!(code = %envelope.code_text(), message = ?envelope.message, "Device list request rejected");
            return Ok(None);
        }

        let devices: Vec<DeviceEntry> = match envelope.data {
            Value::Null => Vec::new(),
            data => serde_json::from_value(data)?,
        };

        let device = devices.into_iter().next().map(|d| DeviceId::new(d.sn));
        debug!(device = ?device, "Resolved device");
        Ok(device)
    }

    /// Fetch the current metrics for `device`.
    pub async fn fetch_reading(&self, device: &DeviceId) -> Result<ReadingOutcome> {
        let params = [("sn", device.as_str())];
        let (envelope, raw) = self.get(QUOTA_ALL_PATH, &params).await?;

        if !envelope.is_success() {
            let code = envelope.code_text();
            warn!(device = %device, code = %code, message = ?envelope.message, "Quota request rejected");
            let failure = ApiFailure {
                code,
                message: envelope.message,
                payload: raw,
            };
            return Ok(ReadingOutcome::Failed(failure));
        }

        let quota = match envelope.data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let reading = Reading::from_quota(&quota);
        trace!(device = %device, ?reading, "Quota fetched");
        Ok(ReadingOutcome::Success(reading))
    }

    /// Signed GET returning the decoded envelope and the raw body.
    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<(Envelope, Value)> {
        let url = format!("{}{}", self.host, path);
        let headers = self.signer.sign(params);

        let mut request = self.http.get(&url);
        if !params.is_empty() {
            request = request.query(params);
        }
        let response = headers.apply(request).send().await?;

        let status = response.status();
        let body = response.bytes().await?;

        let raw = match serde_json::from_slice::<Value>(&body) {
            Ok(raw) => raw,
            Err(_) if !status.is_success() => {
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&body).into_owned(),
                })
            }
            Err(e) => return Err(ApiError::Decode(e)),
        };

        let envelope = Envelope::deserialize(&raw)?;
        Ok((envelope, raw))
    }
}
