//! Client configuration.

use std::time::Duration;

/// Timing and sizing knobs for the gateway client.
///
/// The defaults are the values the device firmware was tuned against. None
/// of them is semantically load-bearing; the reconnect delay in particular
/// stays constant (no backoff growth) because the failure domain is a local
/// embedded device expected to recover quickly.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the REST API, e.g. "http://192.168.4.1".
    pub http_base: String,
    /// WebSocket URL for the raw sentence stream.
    pub stream_url: String,
    /// Delay between stream reconnect attempts.
    pub reconnect_delay: Duration,
    /// Per-request timeout on the REST client.
    pub request_timeout: Duration,
    /// Interval between scan status polls.
    pub scan_poll_interval: Duration,
    /// Wall-clock bound on a scan, independent of poll count.
    pub scan_timeout: Duration,
    /// Instrument snapshot refresh period.
    pub instrument_refresh: Duration,
    /// System status refresh period.
    pub status_refresh: Duration,
    /// Sentence monitor capacity; oldest entries are evicted past this.
    pub monitor_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_host("192.168.4.1")
    }
}

impl ClientConfig {
    /// Configuration for a gateway reachable at `host` (name or address).
    pub fn for_host(host: &str) -> Self {
        Self {
            http_base: format!("http://{host}"),
            stream_url: format!("ws://{host}/ws/nmea"),
            reconnect_delay: Duration::from_secs(3),
            request_timeout: Duration::from_secs(8),
            scan_poll_interval: Duration::from_secs(1),
            scan_timeout: Duration::from_secs(15),
            instrument_refresh: Duration::from_secs(2),
            status_refresh: Duration::from_secs(5),
            monitor_capacity: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_host() {
        let config = ClientConfig::for_host("192.168.1.34");
        assert_eq!(config.http_base, "http://192.168.1.34");
        assert_eq!(config.stream_url, "ws://192.168.1.34/ws/nmea");
        assert_eq!(config.reconnect_delay, Duration::from_secs(3));
        assert_eq!(config.monitor_capacity, 100);
    }
}
