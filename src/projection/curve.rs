use crate::config::ProjectionCurve;

impl ProjectionCurve {
    /// Screen offset from center for an angular offset
    ///
    /// `half_fov_degrees` maps to `half_extent` pixels.
    pub fn angle_to_pixels(
        &self,
        angle_degrees: f64,
        half_fov_degrees: f64,
        half_extent: f64,
    ) -> f64 {
        match self {
            ProjectionCurve::Linear => angle_degrees / half_fov_degrees * half_extent,
            ProjectionCurve::Pinhole => {
                angle_degrees.to_radians().tan() / half_fov_degrees.to_radians().tan()
                    * half_extent
            }
        }
    }

    /// Half of the vertical field of view for a viewport aspect (height / width)
    ///
    /// Keeps pixels-per-degree (linear) or focal length (pinhole) equal on
    /// both axes.
    pub fn vertical_half_fov(&self, horizontal_half_degrees: f64, aspect: f64) -> f64 {
        match self {
            ProjectionCurve::Linear => horizontal_half_degrees * aspect,
            ProjectionCurve::Pinhole => (horizontal_half_degrees.to_radians().tan() * aspect)
                .atan()
                .to_degrees(),
        }
    }
}
