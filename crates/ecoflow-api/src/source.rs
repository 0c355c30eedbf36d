//! The station seam consumed by the monitor and the command router.

use async_trait::async_trait;

use crate::client::EcoflowClient;
use crate::error::Result;
use crate::reading::{DeviceId, ReadingOutcome};

/// Anything that can identify the station and read its metrics.
///
/// Implementations must be stateless per call; the monitor and the router
/// share one instance.
#[async_trait]
pub trait StationSource: Send + Sync {
    /// Serial number of the first device, `None` if the API lists none.
    async fn resolve_device_id(&self) -> Result<Option<DeviceId>>;

    /// Current metrics for `device`.
    async fn fetch_reading(&self, device: &DeviceId) -> Result<ReadingOutcome>;
}

#[async_trait]
impl StationSource for EcoflowClient {
    async fn resolve_device_id(&self) -> Result<Option<DeviceId>> {
        EcoflowClient::resolve_device_id(self).await
    }

    async fn fetch_reading(&self, device: &DeviceId) -> Result<ReadingOutcome> {
        EcoflowClient::fetch_reading(self, device).await
    }
}
