#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use arview::geo::{GeoCoordinate, PointOfInterest};
use arview::overlay::{FrameObserver, OverlayStatus};
use arview::projection::ProjectedMarker;
use arview::sensor::{Attitude, LocationFix, SensorEvent};
use arview::simulation::destination;

/// Frames and status changes seen by a [`RecordingObserver`]
#[derive(Default)]
pub struct Recorded {
    pub frames: Vec<Vec<ProjectedMarker>>,
    pub statuses: Vec<OverlayStatus>,
}

impl Recorded {
    pub fn visible_ids(&self, frame: usize) -> Vec<String> {
        self.frames[frame]
            .iter()
            .filter(|m| m.position.is_visible())
            .map(|m| m.id.to_string())
            .collect()
    }
}

pub struct RecordingObserver {
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingObserver {
    pub fn new() -> (Box<Self>, Arc<Mutex<Recorded>>) {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        (
            Box::new(Self {
                recorded: Arc::clone(&recorded),
            }),
            recorded,
        )
    }
}

impl FrameObserver for RecordingObserver {
    fn on_frame(&mut self, markers: &[ProjectedMarker]) {
        self.recorded.lock().unwrap().frames.push(markers.to_vec());
    }

    fn on_status(&mut self, status: OverlayStatus) {
        self.recorded.lock().unwrap().statuses.push(status);
    }
}

/// Poll until `pred` holds or two seconds pass
pub fn wait_for(recorded: &Arc<Mutex<Recorded>>, pred: impl Fn(&Recorded) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if pred(&recorded.lock().unwrap()) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    false
}

pub fn origin() -> GeoCoordinate {
    GeoCoordinate::new(0.0, 0.0)
}

/// Place `distance_m` from `from` along `bearing_degrees`, labelled with its id in capitals
pub fn place_at(
    id: &str,
    from: &GeoCoordinate,
    bearing_degrees: f64,
    distance_m: f64,
) -> PointOfInterest {
    let coordinate = destination(from, bearing_degrees, distance_m);
    PointOfInterest::new(id, id.to_uppercase(), coordinate).unwrap()
}

pub fn fix(coordinate: GeoCoordinate, t: f64) -> SensorEvent {
    SensorEvent::Location(LocationFix {
        coordinate,
        accuracy_m: 5.0,
        timestamp_s: t,
    })
}

pub fn yaw(degrees: f64, t: f64) -> SensorEvent {
    SensorEvent::Attitude(Attitude::from_yaw(degrees, t))
}
