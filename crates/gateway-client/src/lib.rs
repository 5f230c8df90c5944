//! # gateway-client
//!
//! Live telemetry client for the marine gateway dashboard.
//!
//! This crate provides:
//! - A self-healing WebSocket connection to the raw sentence stream
//! - A bounded, pausable log backing the sentence monitor
//! - A generic poller for device operations that complete asynchronously
//!   (WiFi network scans)
//! - An all-or-nothing snapshot builder over the telemetry endpoints,
//!   with an auto-refresh driver
//!
//! Nothing here is fatal: transport drops reconnect on their own, failed
//! refresh cycles keep the previous snapshot, and timed-out operations land
//! in a terminal state the caller can restart from.

pub mod api;
pub mod config;
pub mod error;
pub mod monitor;
pub mod poller;
pub mod snapshot;
pub mod stream;
pub mod wifi;

pub use api::DeviceApi;
pub use config::ClientConfig;
pub use error::ClientError;
pub use monitor::BoundedLog;
pub use poller::{OperationPoller, OperationState, PollStatus, PolledOperation};
pub use snapshot::{AutoRefresh, TelemetrySnapshotBuilder, TelemetrySource};
pub use stream::{ConnectionState, StreamConnection, StreamEvent, SubscriptionHandle};
pub use wifi::WifiScanOperation;
