//! Configuration for the AR overlay.
//!
//! Every field has a default in the `Default` impls below. A TOML file can
//! override any subset of fields:
//!
//! ```toml
//! [sensor]
//! distance_filter_m = 10.0
//!
//! [projection]
//! field_of_view = "58deg"
//! curve = "pinhole"
//!
//! [distance]
//! max_distance_m = 20000.0
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{ArError, Result};

/// Horizontal camera field of view
///
/// Stored in degrees. Can be specified in degrees or radians.
///
/// # Parsing formats
/// - `60` - degrees (no suffix)
/// - `60deg` or `60°` - degrees (explicit)
/// - `1.047rad` - radians
///
/// # Example
/// ```
/// use arview::config::FieldOfView;
///
/// let fov: FieldOfView = "1.0471976rad".parse().unwrap();
/// assert!((fov.as_degrees() - 60.0).abs() < 0.001);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "FieldOfViewValue")]
pub struct FieldOfView(f64);

impl FieldOfView {
    /// Create from an angle in degrees
    pub fn from_degrees(degrees: f64) -> Self {
        Self(degrees)
    }

    /// Create from an angle in radians
    pub fn from_radians(radians: f64) -> Self {
        Self(radians.to_degrees())
    }

    /// Get the angle in degrees
    pub fn as_degrees(&self) -> f64 {
        self.0
    }

    /// Half of the field of view in degrees
    pub fn half_degrees(&self) -> f64 {
        self.0 / 2.0
    }
}

impl Default for FieldOfView {
    fn default() -> Self {
        Self::from_degrees(60.0)
    }
}

impl fmt::Display for FieldOfView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}deg", self.0)
    }
}

impl FromStr for FieldOfView {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        let fov = if let Some(num) = s.strip_suffix("rad") {
            let rad: f64 = num
                .trim()
                .parse()
                .map_err(|_| format!("invalid field of view: {}", s))?;
            Self::from_radians(rad)
        } else {
            let num = s
                .strip_suffix("deg")
                .or_else(|| s.strip_suffix('°'))
                .unwrap_or(s);
            let deg: f64 = num
                .trim()
                .parse()
                .map_err(|_| format!("invalid field of view: {}", s))?;
            Self::from_degrees(deg)
        };

        if !(fov.0 > 0.0 && fov.0 < 180.0) {
            return Err("field of view must be between 0 and 180 degrees".to_string());
        }
        Ok(fov)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldOfViewValue {
    Degrees(f64),
    Text(String),
}

impl TryFrom<FieldOfViewValue> for FieldOfView {
    type Error = String;

    fn try_from(value: FieldOfViewValue) -> std::result::Result<Self, Self::Error> {
        match value {
            FieldOfViewValue::Degrees(deg) => deg.to_string().parse(),
            FieldOfViewValue::Text(s) => s.parse(),
        }
    }
}

/// Mapping from angular offset to screen offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectionCurve {
    /// Pixels proportional to angle (uniform spacing across the frame)
    Linear,
    /// Rectilinear lens model: pixels proportional to tan(angle)
    Pinhole,
}

/// Screen area markers are projected onto, in points
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Height over width
    pub fn aspect(&self) -> f64 {
        self.height / self.width
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// System-wide overlay configuration
///
/// Use `ArConfig::default()` for sensible defaults, or [`ArConfig::load`] to
/// read overrides from a TOML file.
///
/// # Example
/// ```
/// use arview::config::ArConfig;
///
/// let mut config = ArConfig::default();
/// config.sensor.max_attitude_hz = 30.0;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArConfig {
    /// Sensor sampling configuration
    pub sensor: SensorConfig,
    /// Screen projection configuration
    pub projection: ProjectionConfig,
    /// Distance scaling and culling configuration
    pub distance: DistanceConfig,
}

/// Sensor sampling configuration
///
/// Location is sampled coarsely, attitude at display rate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Minimum movement in meters before a new location fix is accepted
    pub distance_filter_m: f64,
    /// Maximum accepted attitude sample rate in Hz
    pub max_attitude_hz: f64,
    /// Circular moving average window for heading (1 disables smoothing)
    pub heading_smoothing_window: usize,
    /// Capacity of the bounded event channel between sources and the session
    pub channel_capacity: usize,
}

/// Screen projection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Horizontal camera field of view
    pub field_of_view: FieldOfView,
    /// Angle-to-pixel mapping
    pub curve: ProjectionCurve,
    /// Target viewport
    pub viewport: Viewport,
    /// Rotate marker positions about the viewport center to cancel device roll
    pub compensate_roll: bool,
}

/// Distance scaling and culling configuration
///
/// Marker scale is `reference_distance_m / distance`, clamped to
/// `[min_scale, 1.0]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DistanceConfig {
    /// Markers beyond this distance are not visible (`None` disables culling)
    pub max_distance_m: Option<f64>,
    /// Distance at and below which markers are drawn at full scale
    pub reference_distance_m: f64,
    /// Smallest scale applied to distant markers
    pub min_scale: f64,
}

impl ArConfig {
    /// Parse configuration overrides from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ArError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration overrides from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        let fov = self.projection.field_of_view.as_degrees();
        if !(fov > 0.0 && fov < 180.0) {
            return Err(ArError::Config(format!(
                "field of view {} out of range (0, 180)",
                fov
            )));
        }
        let vp = self.projection.viewport;
        if !(vp.width > 0.0 && vp.height > 0.0) {
            return Err(ArError::Config(format!(
                "viewport {}x{} must be positive",
                vp.width, vp.height
            )));
        }
        if !(self.sensor.max_attitude_hz > 0.0) {
            return Err(ArError::Config("max_attitude_hz must be positive".into()));
        }
        if self.sensor.distance_filter_m < 0.0 {
            return Err(ArError::Config(
                "distance_filter_m must not be negative".into(),
            ));
        }
        if self.sensor.heading_smoothing_window == 0 {
            return Err(ArError::Config(
                "heading_smoothing_window must be at least 1".into(),
            ));
        }
        if self.sensor.channel_capacity == 0 {
            return Err(ArError::Config("channel_capacity must be at least 1".into()));
        }
        if !(self.distance.min_scale > 0.0 && self.distance.min_scale <= 1.0) {
            return Err(ArError::Config("min_scale must be in (0, 1]".into()));
        }
        if !(self.distance.reference_distance_m > 0.0) {
            return Err(ArError::Config(
                "reference_distance_m must be positive".into(),
            ));
        }
        if let Some(max) = self.distance.max_distance_m
            && !(max > 0.0)
        {
            return Err(ArError::Config("max_distance_m must be positive".into()));
        }
        Ok(())
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            distance_filter_m: 5.0,
            max_attitude_hz: 60.0,
            heading_smoothing_window: 1,
            channel_capacity: 64,
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            field_of_view: FieldOfView::default(),
            curve: ProjectionCurve::Linear,
            viewport: Viewport::default(),
            compensate_roll: true,
        }
    }
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            max_distance_m: None,
            reference_distance_m: 100.0,
            min_scale: 0.25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_of_view_from_degrees() {
        let fov: FieldOfView = "60".parse().unwrap();
        assert!((fov.as_degrees() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_field_of_view_explicit_suffix() {
        let fov: FieldOfView = "58.5deg".parse().unwrap();
        assert!((fov.as_degrees() - 58.5).abs() < 1e-9);

        let fov: FieldOfView = "45°".parse().unwrap();
        assert!((fov.as_degrees() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_field_of_view_from_radians() {
        let fov: FieldOfView = "1.5707963rad".parse().unwrap();
        assert!((fov.as_degrees() - 90.0).abs() < 0.001);
    }

    #[test]
    fn test_field_of_view_invalid() {
        assert!("abc".parse::<FieldOfView>().is_err());
        assert!("0".parse::<FieldOfView>().is_err());
        assert!("-30deg".parse::<FieldOfView>().is_err());
        assert!("180".parse::<FieldOfView>().is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ArConfig::default().validate().is_ok());
    }

    #[test]
    fn test_toml_overrides() {
        let config = ArConfig::from_toml_str(
            r#"
            [sensor]
            distance_filter_m = 12.5

            [projection]
            field_of_view = "50deg"
            curve = "pinhole"
            viewport = { width = 320.0, height = 480.0 }

            [distance]
            max_distance_m = 5000.0
            "#,
        )
        .unwrap();

        assert!((config.sensor.distance_filter_m - 12.5).abs() < 1e-9);
        assert!((config.sensor.max_attitude_hz - 60.0).abs() < 1e-9);
        assert!((config.projection.field_of_view.as_degrees() - 50.0).abs() < 1e-9);
        assert_eq!(config.projection.curve, ProjectionCurve::Pinhole);
        assert!((config.projection.viewport.width - 320.0).abs() < 1e-9);
        assert_eq!(config.distance.max_distance_m, Some(5000.0));
        assert!((config.distance.min_scale - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_toml_numeric_field_of_view() {
        let config = ArConfig::from_toml_str("[projection]\nfield_of_view = 70.0\n").unwrap();
        assert!((config.projection.field_of_view.as_degrees() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_toml_rejects_bad_values() {
        assert!(ArConfig::from_toml_str("[sensor]\nmax_attitude_hz = 0.0\n").is_err());
        assert!(ArConfig::from_toml_str("[distance]\nmin_scale = 2.0\n").is_err());
        assert!(ArConfig::from_toml_str("[projection]\nfield_of_view = \"200\"\n").is_err());
    }
}
