//! Client error taxonomy.
//!
//! Transport errors feed the stream's reconnect loop and are not surfaced as
//! hard failures; request failures abort a refresh cycle wholesale; operation
//! timeout is kept distinct from a device-reported failure so callers can
//! offer "try again" rather than "device error" messaging.

use std::time::Duration;

use thiserror::Error;

/// Errors produced by the gateway client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The streaming transport dropped or refused the connection.
    #[error("transport error: {0}")]
    Transport(String),

    /// An HTTP request failed at the network level.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The device answered with a non-success status.
    #[error("device returned {status} for {path}")]
    Status { path: String, status: u16 },

    /// A polled operation exceeded its client-side wall-clock bound.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// The device explicitly reported the operation as failed.
    #[error("device reported failure: {0}")]
    Device(String),
}
