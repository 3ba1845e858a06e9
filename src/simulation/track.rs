use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::constants::EARTH_RADIUS_M;
use crate::error::{ArError, Result};
use crate::geo::GeoCoordinate;
use crate::sensor::{
    Attitude, LocationFix, Recording, ReplaySource, SensorEvent, SensorKind, SensorSource,
    SensorStatus,
};

/// Synthetic walk: the device moves along a fixed course while the camera
/// sweeps left and right around it
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub seed: Option<u64>,
    pub start: GeoCoordinate,
    pub duration_s: f64,
    pub walk_speed_mps: f64,
    pub course_degrees: f64,
    pub location_hz: f64,
    pub attitude_hz: f64,
    /// Peak yaw deviation from the course
    pub yaw_sweep_degrees: f64,
    pub yaw_period_s: f64,
    pub pitch_degrees: f64,
    pub location_noise_m: f64,
    pub heading_noise_degrees: f64,
    pub accuracy_m: f64,
    /// Report the motion sensor as unavailable and emit yaw only
    pub motion_unavailable: bool,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            seed: None,
            start: GeoCoordinate::new(37.7749, -122.4194),
            duration_s: 60.0,
            walk_speed_mps: 1.4,
            course_degrees: 0.0,
            location_hz: 1.0,
            attitude_hz: 30.0,
            yaw_sweep_degrees: 90.0,
            yaw_period_s: 20.0,
            pitch_degrees: 0.0,
            location_noise_m: 3.0,
            heading_noise_degrees: 2.0,
            accuracy_m: 5.0,
            motion_unavailable: false,
        }
    }
}

impl TrackConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn without_noise(mut self) -> Self {
        self.location_noise_m = 0.0;
        self.heading_noise_degrees = 0.0;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.start.is_valid() {
            return Err(ArError::Config(format!(
                "track start ({}, {}) is not a valid coordinate",
                self.start.latitude, self.start.longitude
            )));
        }
        for (name, value) in [
            ("duration_s", self.duration_s),
            ("location_hz", self.location_hz),
            ("attitude_hz", self.attitude_hz),
            ("yaw_period_s", self.yaw_period_s),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ArError::Config(format!("{} must be positive", name)));
            }
        }
        if self.location_noise_m < 0.0 || self.heading_noise_degrees < 0.0 {
            return Err(ArError::Config("noise levels must not be negative".into()));
        }
        Ok(())
    }
}

/// Point reached from `from` after `distance_m` along an initial bearing
pub fn destination(from: &GeoCoordinate, bearing_degrees: f64, distance_m: f64) -> GeoCoordinate {
    let delta = distance_m / EARTH_RADIUS_M;
    let theta = bearing_degrees.to_radians();
    let phi1 = from.latitude.to_radians();
    let lambda1 = from.longitude.to_radians();

    let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());

    let longitude = (lambda2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
    GeoCoordinate {
        latitude: phi2.to_degrees(),
        longitude,
        altitude: from.altitude,
    }
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

fn normal(std_dev: f64) -> Result<Normal<f64>> {
    Normal::new(0.0, std_dev).map_err(|e| ArError::Config(format!("noise: {}", e)))
}

/// Generate a recording of the configured walk, ordered by timestamp
pub fn simulate_track(config: &TrackConfig) -> Result<Recording> {
    config.validate()?;

    let mut rng = create_rng(config.seed);
    let position_noise = normal(config.location_noise_m)?;
    let heading_noise = normal(config.heading_noise_degrees)?;

    let mut events = Vec::new();
    if config.motion_unavailable {
        events.push(SensorEvent::Status {
            sensor: SensorKind::Motion,
            status: SensorStatus::Unavailable,
        });
    }

    let fixes = (config.duration_s * config.location_hz).floor() as usize;
    for i in 0..=fixes {
        let t = i as f64 / config.location_hz;
        let truth = destination(&config.start, config.course_degrees, config.walk_speed_mps * t);
        let north = position_noise.sample(&mut rng);
        let east = position_noise.sample(&mut rng);
        let noisy = destination(&destination(&truth, 0.0, north), 90.0, east);
        events.push(SensorEvent::Location(LocationFix {
            coordinate: noisy,
            accuracy_m: config.accuracy_m,
            timestamp_s: t,
        }));
    }

    let ticks = (config.duration_s * config.attitude_hz).floor() as usize;
    for i in 0..=ticks {
        let t = i as f64 / config.attitude_hz;
        let phase = 2.0 * std::f64::consts::PI * t / config.yaw_period_s;
        let yaw = (config.course_degrees
            + config.yaw_sweep_degrees * phase.sin()
            + heading_noise.sample(&mut rng))
        .rem_euclid(360.0);
        let attitude = if config.motion_unavailable {
            Attitude::from_yaw(yaw, t)
        } else {
            Attitude::new(yaw, config.pitch_degrees, 0.0, t)
        };
        events.push(SensorEvent::Attitude(attitude));
    }

    // Status events have no timestamp and stay at the front
    events.sort_by(|a, b| {
        let ta = a.timestamp_s().unwrap_or(f64::NEG_INFINITY);
        let tb = b.timestamp_s().unwrap_or(f64::NEG_INFINITY);
        ta.total_cmp(&tb)
    });

    log::debug!(
        "simulated {} events over {:.1}s ({} fixes, {} attitude samples)",
        events.len(),
        config.duration_s,
        fixes + 1,
        ticks + 1
    );
    Ok(Recording::new(events))
}

/// Sensor source backed by a freshly simulated track
pub struct SimulatedSource {
    inner: ReplaySource,
}

impl SimulatedSource {
    /// Location and motion sources sharing one simulated track
    pub fn pair(config: &TrackConfig, speed: f64) -> Result<(Self, Self)> {
        let recording = simulate_track(config)?;
        Ok((
            Self {
                inner: recording.location_source(speed),
            },
            Self {
                inner: recording.motion_source(speed),
            },
        ))
    }
}

impl SensorSource for SimulatedSource {
    fn start(&mut self, tx: crossbeam_channel::Sender<SensorEvent>) -> Result<()> {
        self.inner.start(tx)
    }

    fn stop(&mut self) {
        self.inner.stop()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn kinds(&self) -> Option<&[SensorKind]> {
        self.inner.kinds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::bearing_and_distance;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_destination_recovers_bearing_and_distance() {
        let start = GeoCoordinate::new(51.5, -0.12);
        let end = destination(&start, 60.0, 2500.0);
        let (bearing, distance) = bearing_and_distance(&start, &end);
        assert_abs_diff_eq!(bearing, 60.0, epsilon = 1e-6);
        assert_abs_diff_eq!(distance, 2500.0, epsilon = 1e-3);
    }

    #[test]
    fn test_destination_wraps_antimeridian() {
        let start = GeoCoordinate::new(0.0, 179.999);
        let end = destination(&start, 90.0, 1000.0);
        assert!(end.longitude < -179.0, "{}", end.longitude);
    }

    #[test]
    fn test_seeded_track_is_reproducible() {
        let config = TrackConfig {
            duration_s: 5.0,
            ..TrackConfig::default()
        }
        .with_seed(42);
        let a = simulate_track(&config).unwrap();
        let b = simulate_track(&config).unwrap();
        assert_eq!(a.events(), b.events());
        assert_eq!(a.len(), 6 + 151);
    }

    #[test]
    fn test_track_is_time_ordered() {
        let config = TrackConfig {
            duration_s: 3.0,
            motion_unavailable: true,
            ..TrackConfig::default()
        }
        .with_seed(7);
        let recording = simulate_track(&config).unwrap();
        assert!(matches!(
            recording.events()[0],
            SensorEvent::Status {
                sensor: SensorKind::Motion,
                status: SensorStatus::Unavailable
            }
        ));
        let times: Vec<f64> = recording
            .events()
            .iter()
            .filter_map(SensorEvent::timestamp_s)
            .collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
        assert!(recording.events().iter().all(|e| match e {
            SensorEvent::Attitude(att) => att.pitch_degrees.is_none(),
            _ => true,
        }));
    }

    #[test]
    fn test_noiseless_walk_follows_course() {
        let config = TrackConfig {
            duration_s: 10.0,
            course_degrees: 90.0,
            ..TrackConfig::default()
        }
        .without_noise()
        .with_seed(1);
        let recording = simulate_track(&config).unwrap();
        let last_fix = recording
            .events()
            .iter()
            .rev()
            .find_map(|e| match e {
                SensorEvent::Location(fix) => Some(*fix),
                _ => None,
            })
            .unwrap();
        let (bearing, distance) = bearing_and_distance(&config.start, &last_fix.coordinate);
        assert_abs_diff_eq!(bearing, 90.0, epsilon = 0.01);
        assert_abs_diff_eq!(distance, 14.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_bad_rates() {
        let config = TrackConfig {
            attitude_hz: 0.0,
            ..TrackConfig::default()
        };
        assert!(matches!(simulate_track(&config), Err(ArError::Config(_))));
    }
}
