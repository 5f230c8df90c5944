//! The tagged wire-to-display unit for a single instrument reading.
//!
//! Every value the device reports arrives as a `{value, unit, age}` triple
//! where `age` is seconds since the device captured the reading. At snapshot
//! build time the triple is converted once into a [`TelemetryField`] with an
//! absolute capture instant, so repeated renders can recompute staleness
//! without re-fetching.

use std::time::{Duration, Instant};

use serde::Deserialize;

/// A reading older than this is rendered as stale.
pub const STALE_AFTER: Duration = Duration::from_secs(10);

/// One field object as serialized by the device.
///
/// The device nulls out `value` and `age` when it has no current reading;
/// `unit` may still be present.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawReading {
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub age: Option<f64>,
}

/// A single instrument reading tagged with validity and capture time.
///
/// `value` of `None` means "no reading available, display as placeholder".
/// Fields are immutable once constructed; a refresh cycle replaces the whole
/// snapshot rather than mutating individual fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryField<T = f64> {
    pub value: Option<T>,
    pub unit: Option<String>,
    /// Age in seconds as reported by the device, if it reported one.
    pub device_age: Option<f64>,
    /// Absolute capture instant derived from `device_age` at build time.
    pub captured_at: Option<Instant>,
}

impl<T> TelemetryField<T> {
    /// A field with no reading.
    pub fn invalid() -> Self {
        Self {
            value: None,
            unit: None,
            device_age: None,
            captured_at: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    /// Whether the reading has outlived [`STALE_AFTER`] at the given render
    /// instant. A field without a capture instant is never stale; it is
    /// either invalid (rendered as placeholder anyway) or ageless.
    pub fn is_stale_at(&self, now: Instant) -> bool {
        match self.captured_at {
            Some(captured) => now.saturating_duration_since(captured) > STALE_AFTER,
            None => self
                .device_age
                .map(|age| age > STALE_AFTER.as_secs_f64())
                .unwrap_or(false),
        }
    }
}

impl<T> Default for TelemetryField<T> {
    fn default() -> Self {
        Self::invalid()
    }
}

impl TelemetryField<f64> {
    /// Convert a wire triple into a tagged field, anchoring the reported age
    /// to `now`. A missing triple or a null value yields an invalid field
    /// rather than an absent one, so presentation code never branches on
    /// key existence.
    pub fn from_reading(reading: Option<RawReading>, now: Instant) -> Self {
        let Some(reading) = reading else {
            return Self::invalid();
        };

        let captured_at = reading
            .age
            .filter(|age| *age >= 0.0)
            .and_then(|age| Duration::try_from_secs_f64(age).ok())
            .and_then(|age| now.checked_sub(age));

        Self {
            value: reading.value,
            unit: reading.unit,
            device_age: reading.age,
            captured_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn reading(value: Option<f64>, unit: &str, age: Option<f64>) -> RawReading {
        RawReading {
            value,
            unit: Some(unit.to_string()),
            age,
        }
    }

    #[test]
    fn test_missing_reading_is_invalid() {
        let now = Instant::now();
        let field = TelemetryField::from_reading(None, now);
        assert!(!field.is_valid());
        assert_eq!(field.value, None);
        assert_eq!(field.captured_at, None);
    }

    #[test]
    fn test_null_value_is_invalid() {
        let now = Instant::now();
        let field = TelemetryField::from_reading(Some(reading(None, "kn", None)), now);
        assert!(!field.is_valid());
        // Unit survives even without a value, as the device serializes it.
        assert_eq!(field.unit.as_deref(), Some("kn"));
    }

    #[test]
    fn test_age_anchored_to_build_instant() {
        let now = Instant::now();
        let field = TelemetryField::from_reading(Some(reading(Some(6.2), "kn", Some(3.0))), now);
        assert!(field.is_valid());
        assert_eq!(field.device_age, Some(3.0));

        let captured = field.captured_at.expect("capture instant");
        assert_eq!(now.duration_since(captured), Duration::from_secs(3));
    }

    #[test]
    fn test_staleness_threshold() {
        let now = Instant::now();
        let fresh = TelemetryField::from_reading(Some(reading(Some(6.2), "kn", Some(3.0))), now);
        let old = TelemetryField::from_reading(Some(reading(Some(6.2), "kn", Some(11.0))), now);

        assert!(!fresh.is_stale_at(now));
        assert!(old.is_stale_at(now));

        // A fresh reading goes stale as render time advances past the bound.
        assert!(fresh.is_stale_at(now + Duration::from_secs(8)));
    }

    #[test]
    fn test_ageless_reading_never_stale() {
        let now = Instant::now();
        let field = TelemetryField::from_reading(Some(reading(Some(1.0), "m", None)), now);
        assert!(!field.is_stale_at(now + Duration::from_secs(3600)));
    }

    #[test]
    fn test_raw_reading_deserialize() {
        let json = r#"{"value": 4.2, "unit": "m", "age": 1.5}"#;
        let reading: RawReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.value, Some(4.2));
        assert_eq!(reading.unit.as_deref(), Some("m"));
        assert_eq!(reading.age, Some(1.5));

        let json = r#"{"value": null, "unit": "m", "age": null}"#;
        let reading: RawReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.value, None);
        assert_eq!(reading.age, None);
    }
}
