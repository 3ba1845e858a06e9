pub mod curve;
pub mod math;
pub mod projector;

pub use math::{angle_difference, normalize_degrees};
pub use projector::{
    OverlayProjector, ProjectedMarker, ScreenPosition, TargetBearing, compute_targets,
};
