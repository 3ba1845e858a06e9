use super::{FrameOutput, Formatter};
use crate::geo::places::format_distance;

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, output: &FrameOutput) -> Option<String> {
        let mut line = format!(
            "[{:>8.2}s] yaw {:>5.1}° {}/{} visible",
            output.timestamp_s,
            output.yaw_degrees,
            output.visible_count(),
            output.markers.len()
        );

        for marker in output.markers {
            match marker.position.coords() {
                Some((x, y)) => line.push_str(&format!(
                    " | {} @ ({:.0}, {:.0}) {}",
                    marker.label,
                    x,
                    y,
                    format_distance(marker.distance_m)
                )),
                None if self.verbose => line.push_str(&format!(
                    " | {} off-screen ({:.0}°, {})",
                    marker.label,
                    marker.bearing_degrees,
                    format_distance(marker.distance_m)
                )),
                None => {}
            }
        }
        Some(line)
    }
}
