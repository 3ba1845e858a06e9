use crate::sensor::{Attitude, LocationFix, SensorKind, SensorStatus};

use super::OverlayStatus;

/// Latest accepted sensor readings and sensor availability
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceState {
    pub location: Option<LocationFix>,
    pub attitude: Option<Attitude>,
    pub location_status: SensorStatus,
    pub heading_status: SensorStatus,
    pub motion_status: SensorStatus,
}

impl DeviceState {
    pub fn status_of(&self, kind: SensorKind) -> SensorStatus {
        match kind {
            SensorKind::Location => self.location_status,
            SensorKind::Heading => self.heading_status,
            SensorKind::Motion => self.motion_status,
        }
    }

    pub fn set_status(&mut self, kind: SensorKind, status: SensorStatus) {
        match kind {
            SensorKind::Location => self.location_status = status,
            SensorKind::Heading => self.heading_status = status,
            SensorKind::Motion => self.motion_status = status,
        }
    }

    /// True when markers can be placed: a heading is trusted and a fix exists
    pub fn can_project(&self) -> bool {
        self.location.is_some()
            && self.location_status == SensorStatus::Available
            && self.heading_status == SensorStatus::Available
    }

    /// Summary status; permission problems outrank missing sensors, which
    /// outrank waiting for data
    pub fn overlay_status(&self) -> OverlayStatus {
        for kind in SensorKind::ALL {
            if self.status_of(kind) == SensorStatus::PermissionDenied {
                return OverlayStatus::PermissionDenied(kind);
            }
        }
        for kind in SensorKind::ALL {
            if self.status_of(kind) == SensorStatus::Unavailable {
                return OverlayStatus::SensorUnavailable(kind);
            }
        }
        if self.location.is_none() || self.attitude.is_none() {
            OverlayStatus::Searching
        } else {
            OverlayStatus::Tracking
        }
    }
}
