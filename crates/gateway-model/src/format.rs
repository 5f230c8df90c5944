//! Display formatting for instrument and AIS values.
//!
//! Pure, total functions: invalid or absent readings format as the `--`
//! placeholder, never as an error. Staleness is recomputed against the
//! caller's render instant so a snapshot can be redrawn without refetching.

use std::time::Instant;

use crate::field::TelemetryField;

/// Rendered in place of any missing reading.
pub const PLACEHOLDER: &str = "--";

pub const METERS_PER_NAUTICAL_MILE: f64 = 1852.0;

/// A formatted instrument value plus its staleness classification.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDisplay {
    pub text: String,
    pub stale: bool,
}

/// Format a numeric field to one decimal place with its unit, e.g. "6.2 kn".
///
/// Invalid fields render as the placeholder and are classified stale so the
/// card dims the same way it does for an outdated reading.
pub fn format_field(field: &TelemetryField<f64>, now: Instant) -> FieldDisplay {
    let Some(value) = field.value else {
        return FieldDisplay {
            text: PLACEHOLDER.to_string(),
            stale: true,
        };
    };

    let text = match field.unit.as_deref() {
        Some(unit) if !unit.is_empty() => format!("{value:.1} {unit}"),
        _ => format!("{value:.1}"),
    };

    FieldDisplay {
        text,
        stale: field.is_stale_at(now),
    }
}

/// Format a position as degrees with hemisphere letters,
/// e.g. "42.12345°N, 8.60000°W". Placeholder unless both halves are valid.
pub fn format_lat_lon(lat: &TelemetryField<f64>, lon: &TelemetryField<f64>) -> String {
    match (lat.value, lon.value) {
        (Some(lat), Some(lon)) => {
            let ns = if lat >= 0.0 { 'N' } else { 'S' };
            let ew = if lon >= 0.0 { 'E' } else { 'W' };
            format!("{:.5}°{}, {:.5}°{}", lat.abs(), ns, lon.abs(), ew)
        }
        _ => PLACEHOLDER.to_string(),
    }
}

/// Format a distance in nautical miles, switching to whole meters below
/// 1 nm for legibility at close range.
pub fn format_distance(nm: Option<f64>) -> String {
    match nm {
        None => PLACEHOLDER.to_string(),
        Some(nm) if nm < 1.0 => format!("{:.0} m", nm * METERS_PER_NAUTICAL_MILE),
        Some(nm) => format!("{nm:.2} nm"),
    }
}

/// Format a time-to-closest-approach given in minutes. Negative means the
/// closest point is already astern and renders as the placeholder.
pub fn format_time_to_cpa(minutes: Option<f64>) -> String {
    match minutes {
        None => PLACEHOLDER.to_string(),
        Some(m) if m < 0.0 => PLACEHOLDER.to_string(),
        Some(m) if m < 1.0 => format!("{:.0}s", m * 60.0),
        Some(m) if m < 60.0 => format!("{m:.0}min"),
        Some(m) => format!("{:.1}h", m / 60.0),
    }
}

/// Whole-degree angle for bearings and courses, e.g. "95°".
pub fn format_angle(degrees: Option<f64>) -> String {
    match degrees {
        Some(deg) => format!("{deg:.0}°"),
        None => PLACEHOLDER.to_string(),
    }
}

/// One-decimal speed in knots, e.g. "14.2 kn".
pub fn format_speed(knots: Option<f64>) -> String {
    match knots {
        Some(kn) => format!("{kn:.1} kn"),
        None => PLACEHOLDER.to_string(),
    }
}
