use std::fmt;

use crate::projection::ProjectedMarker;
use crate::sensor::{Attitude, SensorKind};

/// Overall health of the overlay, reported whenever it changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayStatus {
    /// Waiting for a first location fix or attitude sample
    Searching,
    /// Location and heading are flowing; frames carry real positions
    Tracking,
    /// A sensor permission was refused; that stream is off for this run
    PermissionDenied(SensorKind),
    /// A sensor is missing or failed; affected markers are omitted
    SensorUnavailable(SensorKind),
}

impl fmt::Display for OverlayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayStatus::Searching => write!(f, "searching"),
            OverlayStatus::Tracking => write!(f, "tracking"),
            OverlayStatus::PermissionDenied(kind) => write!(f, "{} permission denied", kind),
            OverlayStatus::SensorUnavailable(kind) => write!(f, "{} unavailable", kind),
        }
    }
}

/// Receives overlay output on the session's worker thread
///
/// Callbacks run synchronously between sensor events; keep them short.
pub trait FrameObserver: Send {
    /// Called once per accepted attitude sample
    fn on_frame(&mut self, markers: &[ProjectedMarker]);

    /// Same as `on_frame`, with the attitude sample the frame was computed for
    fn on_attitude_frame(&mut self, _attitude: &Attitude, markers: &[ProjectedMarker]) {
        self.on_frame(markers)
    }

    fn on_status(&mut self, _status: OverlayStatus) {}
}

impl<F> FrameObserver for F
where
    F: FnMut(&[ProjectedMarker]) + Send,
{
    fn on_frame(&mut self, markers: &[ProjectedMarker]) {
        self(markers)
    }
}
