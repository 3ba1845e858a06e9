/// Wrap an angle in degrees to [-180, 180)
pub fn normalize_degrees(degrees: f64) -> f64 {
    (degrees + 180.0).rem_euclid(360.0) - 180.0
}

/// Signed offset from `reference` to `target` in degrees, in [-180, 180)
///
/// Positive when the target lies clockwise of the reference.
pub fn angle_difference(target: f64, reference: f64) -> f64 {
    normalize_degrees(target - reference)
}

/// Rotate a point about a center by `degrees` (clockwise on a y-down screen)
pub fn rotate_about(x: f64, y: f64, cx: f64, cy: f64, degrees: f64) -> (f64, f64) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = x - cx;
    let dy = y - cy;
    (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
}
