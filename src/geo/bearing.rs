use crate::constants::{BEARING_EPSILON, EARTH_RADIUS_M};
use crate::geo::GeoCoordinate;
use crate::projection::math::normalize_degrees;

/// Great-circle bearing and distance from `from` to `to`
///
/// Returns `(bearing_degrees, distance_meters)`. Bearing is the initial
/// course measured clockwise from true north, normalized to [0, 360).
/// Distance uses the haversine formula on a spherical earth.
///
/// When the bearing is undefined (origin at a pole, or both points
/// coincide) the bearing is 0.
///
/// # Example
/// ```
/// use arview::geo::{GeoCoordinate, bearing_and_distance};
///
/// let (bearing, distance) = bearing_and_distance(
///     &GeoCoordinate::new(0.0, 0.0),
///     &GeoCoordinate::new(0.0, 1.0),
/// );
/// assert!((bearing - 90.0).abs() < 1e-9);
/// assert!((distance - 111_195.0).abs() < 1.0);
/// ```
pub fn bearing_and_distance(from: &GeoCoordinate, to: &GeoCoordinate) -> (f64, f64) {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let dphi = phi2 - phi1;
    // Shortest way around, so antimeridian crossings stay continuous
    let dlambda = normalize_degrees(to.longitude - from.longitude).to_radians();

    let a = (dphi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt());
    let distance = EARTH_RADIUS_M * c;

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();

    let at_pole = phi1.cos().abs() < BEARING_EPSILON;
    let coincident = x.abs() < BEARING_EPSILON && y.abs() < BEARING_EPSILON;
    let bearing = if at_pole || coincident {
        0.0
    } else {
        wrap_360(y.atan2(x).to_degrees())
    };

    (bearing, distance)
}

/// Angle of the target above the local horizon in degrees
///
/// Needs both altitudes; returns 0 when either is unknown.
pub fn elevation_degrees(from: &GeoCoordinate, to: &GeoCoordinate, distance_m: f64) -> f64 {
    match (from.altitude, to.altitude) {
        (Some(a), Some(b)) => {
            let ground = distance_m.max(crate::constants::DISTANCE_EPSILON_M);
            (b - a).atan2(ground).to_degrees()
        }
        _ => 0.0,
    }
}

/// Normalize an angle to [0, 360)
pub fn wrap_360(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cardinal_bearings() {
        let origin = GeoCoordinate::new(0.0, 0.0);
        let cases = [
            (GeoCoordinate::new(1.0, 0.0), 0.0),
            (GeoCoordinate::new(0.0, 1.0), 90.0),
            (GeoCoordinate::new(-1.0, 0.0), 180.0),
            (GeoCoordinate::new(0.0, -1.0), 270.0),
        ];
        for (target, expected) in cases {
            let (bearing, _) = bearing_and_distance(&origin, &target);
            assert_abs_diff_eq!(bearing, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let (_, d) =
            bearing_and_distance(&GeoCoordinate::new(0.0, 0.0), &GeoCoordinate::new(1.0, 0.0));
        // 2πR / 360
        assert_abs_diff_eq!(d, 111_194.93, epsilon = 0.1);
    }

    #[test]
    fn test_antimeridian_crossing() {
        let west = GeoCoordinate::new(0.0, 179.9);
        let east = GeoCoordinate::new(0.0, -179.9);

        let (bearing, distance) = bearing_and_distance(&west, &east);
        assert_abs_diff_eq!(bearing, 90.0, epsilon = 1e-6);
        assert!(distance < 25_000.0, "went the long way round: {}", distance);

        let (bearing, _) = bearing_and_distance(&east, &west);
        assert_abs_diff_eq!(bearing, 270.0, epsilon = 1e-6);
    }

    #[test]
    fn test_pole_falls_back_to_zero() {
        let north_pole = GeoCoordinate::new(90.0, 0.0);
        let (bearing, distance) =
            bearing_and_distance(&north_pole, &GeoCoordinate::new(45.0, 30.0));
        assert!(!bearing.is_nan());
        assert!((0.0..360.0).contains(&bearing));
        assert!(distance > 0.0);

        let south_pole = GeoCoordinate::new(-90.0, 0.0);
        let (bearing, _) = bearing_and_distance(&south_pole, &GeoCoordinate::new(0.0, 0.0));
        assert!(!bearing.is_nan());
    }

    #[test]
    fn test_toward_pole_is_north() {
        let (bearing, _) = bearing_and_distance(
            &GeoCoordinate::new(10.0, 45.0),
            &GeoCoordinate::new(90.0, 0.0),
        );
        assert!(bearing < 1e-6 || bearing > 360.0 - 1e-6);
    }

    #[test]
    fn test_coincident_points() {
        let p = GeoCoordinate::new(48.8584, 2.2945);
        let (bearing, distance) = bearing_and_distance(&p, &p);
        assert_eq!(bearing, 0.0);
        assert_eq!(distance, 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = GeoCoordinate::new(37.3318, -122.0312);
        let b = GeoCoordinate::new(40.7484, -73.9857);
        let (_, ab) = bearing_and_distance(&a, &b);
        let (_, ba) = bearing_and_distance(&b, &a);
        assert_abs_diff_eq!(ab, ba, epsilon = 1e-6);
    }

    #[test]
    fn test_bearing_range_over_grid() {
        let origin = GeoCoordinate::new(51.5, -0.12);
        for lat in (-90..=90).step_by(15) {
            for lon in (-180..=180).step_by(30) {
                let (bearing, distance) =
                    bearing_and_distance(&origin, &GeoCoordinate::new(lat as f64, lon as f64));
                assert!(
                    (0.0..360.0).contains(&bearing),
                    "bearing {} at {},{}",
                    bearing,
                    lat,
                    lon
                );
                assert!(distance >= 0.0);
            }
        }
    }

    #[test]
    fn test_elevation() {
        let from = GeoCoordinate::with_altitude(0.0, 0.0, 0.0);
        let to = GeoCoordinate::with_altitude(0.0, 0.001, 100.0);
        assert_abs_diff_eq!(elevation_degrees(&from, &to, 100.0), 45.0, epsilon = 1e-9);
        assert_eq!(elevation_degrees(&GeoCoordinate::new(0.0, 0.0), &to, 100.0), 0.0);
    }

    #[test]
    fn test_wrap_360() {
        assert_eq!(wrap_360(-90.0), 270.0);
        assert_eq!(wrap_360(360.0), 0.0);
        assert_eq!(wrap_360(725.0), 5.0);
        assert!(wrap_360(-1e-20) < 360.0);
    }
}
