//! Numeric constants for geodesy and projection stability
//!
//! These constants define the earth model and the epsilon values used
//! throughout the bearing and projection math to keep results finite.

/// Mean earth radius in meters (spherical model used by haversine).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Minimum distance in meters used for any inverse-distance calculation.
/// Targets closer than this are treated as being this far away.
pub const DISTANCE_EPSILON_M: f64 = 1.0;

/// Angular epsilon (radians) below which a bearing is considered undefined.
/// Applies at the poles and for coincident points; the bearing falls back to 0.
pub const BEARING_EPSILON: f64 = 1e-12;

/// Roll below this magnitude (degrees) is not applied to screen positions.
pub const ROLL_EPSILON_DEGREES: f64 = 1e-9;
