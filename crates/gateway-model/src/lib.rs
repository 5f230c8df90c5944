//! # gateway-model
//!
//! Data model for the marine gateway dashboard client.
//!
//! This crate provides:
//! - The tagged telemetry field (`TelemetryField`) and its staleness rule
//! - Wire shapes for the boat telemetry, WiFi scan and system status endpoints
//! - The assembled `TelemetrySnapshot` grouped by sensor domain
//! - Pure display formatters for instrument and AIS presentation
//!
//! This crate is intentionally runtime-agnostic and contains no async code
//! or I/O; everything here is constructed from already-fetched responses.

pub mod field;
pub mod format;
pub mod scan;
pub mod status;
pub mod telemetry;

pub use field::{RawReading, TelemetryField, STALE_AFTER};
pub use scan::{NetworkDescriptor, ScanStatus, SignalGrade};
pub use status::SystemStatus;
pub use telemetry::{AisTarget, TelemetrySnapshot, COLLISION_CPA_NM};
