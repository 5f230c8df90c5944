//! WiFi scan wire shapes.
//!
//! A scan is started with `POST /api/wifi/scan` and its progress read back
//! from `GET /api/wifi/scan`, which reports `scanning` until the device has
//! finished collecting networks.

use serde::Deserialize;

/// Response body of `GET /api/wifi/scan`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanStatus {
    pub scanning: bool,
    #[serde(default)]
    pub networks: Vec<NetworkDescriptor>,
}

/// One network found by a scan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NetworkDescriptor {
    pub ssid: String,
    /// Received signal strength in dBm (negative).
    pub rssi: i32,
    #[serde(rename = "quality")]
    pub quality_percent: u8,
    pub channel: u8,
    /// Encryption scheme name as reported by the device, e.g. "Open",
    /// "WPA2", "WPA3".
    #[serde(rename = "encryption_type")]
    pub encryption: String,
}

/// Coarse signal bands used for list highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalGrade {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl NetworkDescriptor {
    pub fn is_open(&self) -> bool {
        self.encryption == "Open"
    }

    pub fn signal_grade(&self) -> SignalGrade {
        match self.quality_percent {
            75..=u8::MAX => SignalGrade::Excellent,
            50..=74 => SignalGrade::Good,
            25..=49 => SignalGrade::Fair,
            _ => SignalGrade::Poor,
        }
    }
}
