use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ArError, Result};
use crate::geo::GeoCoordinate;

/// Physical sensor a status or sample belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Position fixes (GNSS / network location)
    Location,
    /// Compass heading (yaw)
    Heading,
    /// Gravity/gyro derived pitch and roll
    Motion,
}

impl SensorKind {
    pub const ALL: [SensorKind; 3] = [
        SensorKind::Location,
        SensorKind::Heading,
        SensorKind::Motion,
    ];
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorKind::Location => "location",
            SensorKind::Heading => "heading",
            SensorKind::Motion => "motion",
        };
        f.write_str(name)
    }
}

/// Availability reported by a sensor source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorStatus {
    #[default]
    Available,
    PermissionDenied,
    Unavailable,
}

impl SensorStatus {
    /// `Ok` when available, otherwise the matching error for `kind`
    pub fn check(self, kind: SensorKind) -> Result<()> {
        match self {
            SensorStatus::Available => Ok(()),
            SensorStatus::PermissionDenied => Err(ArError::PermissionDenied(kind)),
            SensorStatus::Unavailable => Err(ArError::SensorUnavailable(kind)),
        }
    }
}

/// A single location fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub coordinate: GeoCoordinate,
    /// Horizontal accuracy radius in meters
    pub accuracy_m: f64,
    /// Sensor timestamp in seconds (monotonic, arbitrary epoch)
    pub timestamp_s: f64,
}

/// Device orientation sample
///
/// Yaw is the compass heading of the camera axis, clockwise from true north.
/// Pitch is positive when the camera tilts up; roll is positive clockwise.
/// Pitch and roll are absent when the device has no motion sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attitude {
    pub yaw_degrees: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_degrees: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_degrees: Option<f64>,
    pub timestamp_s: f64,
}

impl Attitude {
    /// Heading-only attitude
    pub fn from_yaw(yaw_degrees: f64, timestamp_s: f64) -> Self {
        Self {
            yaw_degrees,
            pitch_degrees: None,
            roll_degrees: None,
            timestamp_s,
        }
    }

    pub fn new(yaw_degrees: f64, pitch_degrees: f64, roll_degrees: f64, timestamp_s: f64) -> Self {
        Self {
            yaw_degrees,
            pitch_degrees: Some(pitch_degrees),
            roll_degrees: Some(roll_degrees),
            timestamp_s,
        }
    }
}

/// Event delivered by a sensor source
///
/// Serialized one per line in track recordings, tagged by `type`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SensorEvent {
    Location(LocationFix),
    Attitude(Attitude),
    Status { sensor: SensorKind, status: SensorStatus },
}

impl SensorEvent {
    pub fn timestamp_s(&self) -> Option<f64> {
        match self {
            SensorEvent::Location(fix) => Some(fix.timestamp_s),
            SensorEvent::Attitude(att) => Some(att.timestamp_s),
            SensorEvent::Status { .. } => None,
        }
    }

    /// True for events carried by the location stream
    pub fn is_location_stream(&self) -> bool {
        match self {
            SensorEvent::Location(_) => true,
            SensorEvent::Attitude(_) => false,
            SensorEvent::Status { sensor, .. } => *sensor == SensorKind::Location,
        }
    }
}
