use std::sync::Arc;

use crate::config::{ArConfig, DistanceConfig, ProjectionConfig, ProjectionCurve, Viewport};
use crate::constants::{DISTANCE_EPSILON_M, ROLL_EPSILON_DEGREES};
use crate::geo::{GeoCoordinate, PointOfInterest, bearing_and_distance, elevation_degrees};
use crate::sensor::Attitude;

use super::math::{angle_difference, rotate_about};

/// Bearing, distance and elevation from the device to one place
///
/// `index` refers to the place list the target was computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetBearing {
    pub index: usize,
    pub bearing_degrees: f64,
    pub distance_m: f64,
    pub elevation_degrees: f64,
}

/// Recompute targets for every place from the current location
///
/// Reuses `out`'s allocation.
pub fn compute_targets(
    places: &[PointOfInterest],
    location: &GeoCoordinate,
    out: &mut Vec<TargetBearing>,
) {
    out.clear();
    out.extend(places.iter().enumerate().map(|(index, place)| {
        let (bearing_degrees, distance_m) = bearing_and_distance(location, place.coordinate());
        TargetBearing {
            index,
            bearing_degrees,
            distance_m,
            elevation_degrees: elevation_degrees(location, place.coordinate(), distance_m),
        }
    }));
}

/// Where a marker lands on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScreenPosition {
    Visible { x: f64, y: f64 },
    NotVisible,
}

impl ScreenPosition {
    pub fn is_visible(&self) -> bool {
        matches!(self, ScreenPosition::Visible { .. })
    }

    pub fn coords(&self) -> Option<(f64, f64)> {
        match *self {
            ScreenPosition::Visible { x, y } => Some((x, y)),
            ScreenPosition::NotVisible => None,
        }
    }
}

/// One place as it should be drawn this frame
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedMarker {
    pub id: Arc<str>,
    pub label: Arc<str>,
    pub position: ScreenPosition,
    pub bearing_degrees: f64,
    pub distance_m: f64,
    /// Draw scale in [min_scale, 1], smaller for distant places
    pub scale: f64,
}

/// Maps target bearings to screen positions for a device attitude
///
/// Stateless between frames: the output depends only on the targets, the
/// places and the attitude passed in.
#[derive(Debug, Clone)]
pub struct OverlayProjector {
    curve: ProjectionCurve,
    half_fov: f64,
    vertical_half_fov: f64,
    viewport: Viewport,
    compensate_roll: bool,
    distance: DistanceConfig,
}

impl OverlayProjector {
    pub fn new(projection: &ProjectionConfig, distance: &DistanceConfig) -> Self {
        let half_fov = projection.field_of_view.half_degrees();
        let vertical_half_fov = projection
            .curve
            .vertical_half_fov(half_fov, projection.viewport.aspect());
        Self {
            curve: projection.curve,
            half_fov,
            vertical_half_fov,
            viewport: projection.viewport,
            compensate_roll: projection.compensate_roll,
            distance: distance.clone(),
        }
    }

    pub fn from_config(config: &ArConfig) -> Self {
        Self::new(&config.projection, &config.distance)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Half of the vertical field of view in degrees
    pub fn vertical_half_fov(&self) -> f64 {
        self.vertical_half_fov
    }

    /// Screen position of one target
    ///
    /// A target exactly on the edge of the field of view is visible.
    pub fn locate(&self, target: &TargetBearing, attitude: &Attitude) -> ScreenPosition {
        if let Some(max) = self.distance.max_distance_m
            && target.distance_m > max
        {
            return ScreenPosition::NotVisible;
        }

        let horizontal = angle_difference(target.bearing_degrees, attitude.yaw_degrees);
        if horizontal.abs() > self.half_fov {
            return ScreenPosition::NotVisible;
        }

        let vertical = target.elevation_degrees - attitude.pitch_degrees.unwrap_or(0.0);
        if vertical.abs() > self.vertical_half_fov {
            return ScreenPosition::NotVisible;
        }

        let (cx, cy) = self.viewport.center();
        let x = cx + self.curve.angle_to_pixels(horizontal, self.half_fov, cx);
        let y = cy - self.curve.angle_to_pixels(vertical, self.vertical_half_fov, cy);

        match attitude.roll_degrees {
            Some(roll) if self.compensate_roll && roll.abs() > ROLL_EPSILON_DEGREES => {
                let (x, y) = rotate_about(x, y, cx, cy, -roll);
                ScreenPosition::Visible { x, y }
            }
            _ => ScreenPosition::Visible { x, y },
        }
    }

    /// Draw scale for a distance, clamped to [min_scale, 1]
    pub fn scale_for(&self, distance_m: f64) -> f64 {
        let d = distance_m.max(DISTANCE_EPSILON_M);
        (self.distance.reference_distance_m / d).clamp(self.distance.min_scale, 1.0)
    }

    pub fn project(
        &self,
        places: &[PointOfInterest],
        targets: &[TargetBearing],
        attitude: &Attitude,
    ) -> Vec<ProjectedMarker> {
        let mut out = Vec::with_capacity(targets.len());
        self.project_into(places, targets, attitude, &mut out);
        out
    }

    /// Project into a caller-owned buffer, reusing its allocation
    ///
    /// Targets whose index is not in `places` are skipped.
    pub fn project_into(
        &self,
        places: &[PointOfInterest],
        targets: &[TargetBearing],
        attitude: &Attitude,
        out: &mut Vec<ProjectedMarker>,
    ) {
        out.clear();
        out.reserve(targets.len());
        for target in targets {
            let Some(place) = places.get(target.index) else {
                continue;
            };
            out.push(ProjectedMarker {
                id: Arc::clone(place.id()),
                label: Arc::clone(place.label()),
                position: self.locate(target, attitude),
                bearing_degrees: target.bearing_degrees,
                distance_m: target.distance_m,
                scale: self.scale_for(target.distance_m),
            });
        }
    }
}
