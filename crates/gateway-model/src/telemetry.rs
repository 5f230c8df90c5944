//! Boat telemetry wire shapes and the assembled snapshot.
//!
//! The device exposes three independent read endpoints (navigation, wind,
//! AIS). Their responses are deserialized into the `*Readings` structs below
//! and merged into one [`TelemetrySnapshot`]: a fully-formed, internally
//! consistent set of tagged fields produced by a single refresh cycle. A new
//! snapshot always replaces the previous one wholesale.

use std::time::Instant;

use serde::Deserialize;

use crate::field::{RawReading, TelemetryField};

/// AIS targets with a predicted closest approach under this distance are
/// flagged as collision risks for highlighting.
pub const COLLISION_CPA_NM: f64 = 0.5;

// ============================================================
// Wire shapes
// ============================================================
//
// Every level defaults so a device that omits a whole domain still
// deserializes; the missing leaves become invalid fields downstream.

/// Response body of `GET /api/boat/navigation`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NavigationReadings {
    #[serde(default)]
    pub gps: GpsReadings,
    #[serde(default)]
    pub heading: HeadingReadings,
    #[serde(default)]
    pub speed: SpeedReadings,
    #[serde(default)]
    pub depth: DepthReadings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GpsReadings {
    #[serde(default)]
    pub position: PositionReading,
    pub sog: Option<RawReading>,
    pub cog: Option<RawReading>,
    pub satellites: Option<RawReading>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PositionReading {
    pub lat: Option<RawReading>,
    pub lon: Option<RawReading>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeadingReadings {
    pub magnetic: Option<RawReading>,
    pub true_heading: Option<RawReading>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeedReadings {
    pub stw: Option<RawReading>,
    pub trip: Option<RawReading>,
    pub total: Option<RawReading>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepthReadings {
    pub below_transducer: Option<RawReading>,
}

/// Response body of `GET /api/boat/wind`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindReadings {
    pub aws: Option<RawReading>,
    pub awa: Option<RawReading>,
    pub tws: Option<RawReading>,
    pub twa: Option<RawReading>,
    pub twd: Option<RawReading>,
    #[serde(default)]
    pub environment: EnvironmentReadings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvironmentReadings {
    pub water_temp: Option<RawReading>,
    pub air_temp: Option<RawReading>,
    pub pressure: Option<RawReading>,
}

/// Response body of `GET /api/boat/ais`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AisReadings {
    #[serde(default)]
    pub targets: Vec<AisTargetReading>,
}

/// One tracked vessel as serialized by the device.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AisTargetReading {
    pub mmsi: Option<u32>,
    pub name: Option<String>,
    pub distance: Option<f64>,
    pub bearing: Option<f64>,
    pub sog: Option<f64>,
    pub cog: Option<f64>,
    pub cpa: Option<f64>,
    pub tcpa: Option<f64>,
}

// ============================================================
// Assembled snapshot
// ============================================================

/// Position fields in signed decimal degrees.
#[derive(Debug, Clone, Default)]
pub struct PositionFields {
    pub latitude: TelemetryField,
    pub longitude: TelemetryField,
}

/// Speed and course over ground plus speed through water.
#[derive(Debug, Clone, Default)]
pub struct CourseFields {
    pub speed_over_ground: TelemetryField,
    pub course_over_ground: TelemetryField,
    pub speed_through_water: TelemetryField,
    pub satellites: TelemetryField,
}

#[derive(Debug, Clone, Default)]
pub struct HeadingFields {
    pub magnetic: TelemetryField,
    pub true_heading: TelemetryField,
}

#[derive(Debug, Clone, Default)]
pub struct DepthFields {
    pub below_transducer: TelemetryField,
}

#[derive(Debug, Clone, Default)]
pub struct WindFields {
    pub apparent_speed: TelemetryField,
    pub apparent_angle: TelemetryField,
    pub true_speed: TelemetryField,
    pub true_angle: TelemetryField,
    pub true_direction: TelemetryField,
}

#[derive(Debug, Clone, Default)]
pub struct EnvironmentFields {
    pub water_temperature: TelemetryField,
    pub air_temperature: TelemetryField,
    pub pressure: TelemetryField,
}

/// Trip and total distance run.
#[derive(Debug, Clone, Default)]
pub struct LogFields {
    pub trip_distance: TelemetryField,
    pub total_distance: TelemetryField,
}

/// A tracked AIS vessel ready for display.
#[derive(Debug, Clone, Default)]
pub struct AisTarget {
    pub mmsi: Option<u32>,
    pub name: Option<String>,
    pub distance_nm: Option<f64>,
    pub bearing_deg: Option<f64>,
    pub sog_kn: Option<f64>,
    pub cog_deg: Option<f64>,
    pub cpa_nm: Option<f64>,
    pub tcpa_minutes: Option<f64>,
}

impl AisTarget {
    /// Whether the predicted closest approach is inside the highlight
    /// distance. A flag for emphasis, not an alarm.
    pub fn collision_risk(&self) -> bool {
        matches!(self.cpa_nm, Some(cpa) if cpa < COLLISION_CPA_NM)
    }

    fn from_reading(reading: AisTargetReading) -> Self {
        Self {
            mmsi: reading.mmsi,
            name: reading.name,
            distance_nm: reading.distance,
            bearing_deg: reading.bearing,
            sog_kn: reading.sog,
            cog_deg: reading.cog,
            cpa_nm: reading.cpa,
            tcpa_minutes: reading.tcpa,
        }
    }
}

/// One consistent view of everything the instruments display, grouped by
/// sensor domain. Built in one pass from the three endpoint responses.
#[derive(Debug, Clone)]
pub struct TelemetrySnapshot {
    pub position: PositionFields,
    pub course: CourseFields,
    pub heading: HeadingFields,
    pub depth: DepthFields,
    pub wind: WindFields,
    pub environment: EnvironmentFields,
    pub log: LogFields,
    pub ais_targets: Vec<AisTarget>,
    pub built_at: Instant,
}

impl TelemetrySnapshot {
    /// Merge the three endpoint responses into one snapshot, anchoring every
    /// device-reported age to `now`.
    pub fn from_readings(
        nav: NavigationReadings,
        wind: WindReadings,
        ais: AisReadings,
        now: Instant,
    ) -> Self {
        let field = |reading| TelemetryField::from_reading(reading, now);

        Self {
            position: PositionFields {
                latitude: field(nav.gps.position.lat),
                longitude: field(nav.gps.position.lon),
            },
            course: CourseFields {
                speed_over_ground: field(nav.gps.sog),
                course_over_ground: field(nav.gps.cog),
                speed_through_water: field(nav.speed.stw),
                satellites: field(nav.gps.satellites),
            },
            heading: HeadingFields {
                magnetic: field(nav.heading.magnetic),
                true_heading: field(nav.heading.true_heading),
            },
            depth: DepthFields {
                below_transducer: field(nav.depth.below_transducer),
            },
            wind: WindFields {
                apparent_speed: field(wind.aws),
                apparent_angle: field(wind.awa),
                true_speed: field(wind.tws),
                true_angle: field(wind.twa),
                true_direction: field(wind.twd),
            },
            environment: EnvironmentFields {
                water_temperature: field(wind.environment.water_temp),
                air_temperature: field(wind.environment.air_temp),
                pressure: field(wind.environment.pressure),
            },
            log: LogFields {
                trip_distance: field(nav.speed.trip),
                total_distance: field(nav.speed.total),
            },
            ais_targets: ais.targets.into_iter().map(AisTarget::from_reading).collect(),
            built_at: now,
        }
    }
}
