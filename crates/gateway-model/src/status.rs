//! System status wire shape (`GET /api/status`).

use serde::Deserialize;

/// Device health summary polled by the status view.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemStatus {
    /// Seconds since the gateway booted.
    #[serde(default)]
    pub uptime: u64,
    #[serde(default)]
    pub heap: HeapStatus,
    #[serde(default)]
    pub wifi: WifiStatus,
    #[serde(default)]
    pub tcp: TcpStatus,
    #[serde(default)]
    pub uart: UartStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeapStatus {
    pub free: u64,
    pub total: u64,
    pub min_free: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WifiStatus {
    /// "STA", "AP", "Connecting", "Reconnecting" or "Disconnected".
    pub mode: String,
    pub ssid: String,
    pub rssi: i32,
    pub ip: String,
    pub clients: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TcpStatus {
    pub clients: u32,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UartStatus {
    pub baud: u32,
    pub sentences_received: u64,
    pub errors: u64,
}
