//! HTTP access to the gateway's REST endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use gateway_model::scan::ScanStatus;
use gateway_model::status::SystemStatus;
use gateway_model::telemetry::{AisReadings, NavigationReadings, WindReadings};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::snapshot::TelemetrySource;

/// Thin typed client over the device's JSON endpoints.
///
/// Every non-success status or network failure surfaces as an error to the
/// caller; this client never retries on its own. The timers that re-issue
/// reads live in the snapshot builder and the operation poller.
pub struct DeviceApi {
    http: Client,
    base_url: String,
}

impl DeviceApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self {
            http,
            base_url: config.http_base.trim_end_matches('/').to_string(),
        })
    }

    pub async fn navigation(&self) -> Result<NavigationReadings, ClientError> {
        self.get_json("/api/boat/navigation").await
    }

    pub async fn wind(&self) -> Result<WindReadings, ClientError> {
        self.get_json("/api/boat/wind").await
    }

    pub async fn ais(&self) -> Result<AisReadings, ClientError> {
        self.get_json("/api/boat/ais").await
    }

    pub async fn system_status(&self) -> Result<SystemStatus, ClientError> {
        self.get_json("/api/status").await
    }

    /// Ask the device to start a WiFi scan. The scan itself completes
    /// asynchronously; progress is read back with [`Self::wifi_scan_status`].
    pub async fn start_wifi_scan(&self) -> Result<(), ClientError> {
        let path = "/api/wifi/scan";
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                path: path.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }

    pub async fn wifi_scan_status(&self) -> Result<ScanStatus, ClientError> {
        self.get_json("/api/wifi/scan").await
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        debug!("GET {}", path);
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                path: path.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl TelemetrySource for DeviceApi {
    async fn navigation(&self) -> Result<NavigationReadings, ClientError> {
        DeviceApi::navigation(self).await
    }

    async fn wind(&self) -> Result<WindReadings, ClientError> {
        DeviceApi::wind(self).await
    }

    async fn ais(&self) -> Result<AisReadings, ClientError> {
        DeviceApi::ais(self).await
    }
}
