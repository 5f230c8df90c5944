//! WiFi network scan as a polled operation.
//!
//! The scan-then-select workflow in the WiFi configuration view starts a
//! scan, polls its status once a second and offers the found networks for
//! selection. The operation itself is this thin adapter between the device
//! endpoints and the generic poller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use gateway_model::scan::{NetworkDescriptor, ScanStatus};

use crate::api::DeviceApi;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::poller::{OperationPoller, PollStatus, PolledOperation};

/// One WiFi scan against the device.
pub struct WifiScanOperation {
    api: Arc<DeviceApi>,
}

impl WifiScanOperation {
    pub fn new(api: Arc<DeviceApi>) -> Self {
        Self { api }
    }

    /// A poller for this operation with the given timing knobs.
    pub fn poller(
        api: Arc<DeviceApi>,
        poll_interval: Duration,
        timeout: Duration,
    ) -> OperationPoller<WifiScanOperation> {
        OperationPoller::new(Self::new(api), poll_interval, timeout)
    }

    /// A poller with the configured scan cadence.
    pub fn poller_from_config(
        api: Arc<DeviceApi>,
        config: &ClientConfig,
    ) -> OperationPoller<WifiScanOperation> {
        Self::poller(api, config.scan_poll_interval, config.scan_timeout)
    }

    fn status_to_poll(status: ScanStatus) -> PollStatus<Vec<NetworkDescriptor>> {
        if status.scanning {
            PollStatus::InProgress
        } else {
            PollStatus::Complete(status.networks)
        }
    }
}

#[async_trait]
impl PolledOperation for WifiScanOperation {
    type Output = Vec<NetworkDescriptor>;

    async fn begin(&self) -> Result<(), ClientError> {
        self.api.start_wifi_scan().await
    }

    async fn poll(&self) -> Result<PollStatus<Self::Output>, ClientError> {
        Ok(Self::status_to_poll(self.api.wifi_scan_status().await?))
    }
}
