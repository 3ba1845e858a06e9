use crossbeam_channel::{Receiver, bounded};

use super::{
    Attitude, HeadingSmoother, LocationFix, SensorEvent, SensorKind, SensorSource, SensorStatus,
};
use crate::config::SensorConfig;
use crate::error::Result;
use crate::geo::bearing_and_distance;

/// Owns the location and motion sources and their shared event channel
///
/// Each `start` opens a fresh bounded channel so events queued before a
/// `stop` never leak into the next run.
pub struct SensorSampler {
    location: Box<dyn SensorSource>,
    motion: Box<dyn SensorSource>,
    capacity: usize,
    events: Option<Receiver<SensorEvent>>,
    location_running: bool,
    motion_running: bool,
}

impl SensorSampler {
    pub fn new(
        config: &SensorConfig,
        location: Box<dyn SensorSource>,
        motion: Box<dyn SensorSource>,
    ) -> Self {
        Self {
            location,
            motion,
            capacity: config.channel_capacity.max(1),
            events: None,
            location_running: false,
            motion_running: false,
        }
    }

    /// Start both sources. No-op while running.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }

        let (tx, rx) = bounded(self.capacity);
        self.location.start(tx.clone())?;
        self.location_running = true;
        if let Err(e) = self.motion.start(tx) {
            self.location.stop();
            self.location_running = false;
            return Err(e);
        }
        self.motion_running = true;
        self.events = Some(rx);

        log::info!(
            "Sensor sampling started ({} + {})",
            self.location.name(),
            self.motion.name()
        );
        Ok(())
    }

    /// Stop both sources and release the channel. No-op while stopped.
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        self.stop_source(SensorKind::Location);
        self.stop_source(SensorKind::Motion);
        self.events = None;
        log::info!("Sensor sampling stopped");
    }

    /// Stop the source that carries `kind`, leaving the other stream running
    pub fn stop_source(&mut self, kind: SensorKind) {
        match kind {
            SensorKind::Location => {
                if self.location_running {
                    self.location.stop();
                    self.location_running = false;
                    log::debug!("Stopped {}", self.location.name());
                }
            }
            SensorKind::Heading | SensorKind::Motion => {
                if self.motion_running {
                    self.motion.stop();
                    self.motion_running = false;
                    log::debug!("Stopped {}", self.motion.name());
                }
            }
        }
    }

    /// Stop every source whose samples all belong to denied sensors
    ///
    /// A source that still carries a permitted sensor keeps running; the
    /// sample filter drops the denied part of its stream.
    pub fn stop_denied(&mut self, denied: &[SensorKind]) {
        let all_denied = |source: &dyn SensorSource, slot: &[SensorKind]| {
            source
                .kinds()
                .unwrap_or(slot)
                .iter()
                .all(|kind| denied.contains(kind))
        };
        if self.location_running && all_denied(&*self.location, &[SensorKind::Location]) {
            self.stop_source(SensorKind::Location);
        }
        if self.motion_running && all_denied(&*self.motion, &[SensorKind::Heading]) {
            self.stop_source(SensorKind::Motion);
        }
    }

    pub fn is_running(&self) -> bool {
        self.events.is_some()
    }

    /// Receiving end of the current run's event channel
    pub fn events(&self) -> Option<Receiver<SensorEvent>> {
        self.events.clone()
    }
}

impl Drop for SensorSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Rate and distance gating applied to raw sensor events
///
/// Location fixes pass when they are the first fix, when the device moved at
/// least `distance_filter_m`, or when accuracy improved by more than half.
/// Attitude samples pass at most `max_attitude_hz` times per second of sensor
/// time. Sensors whose permission was denied are blocked for good.
pub struct SampleFilter {
    distance_filter_m: f64,
    min_attitude_interval_s: f64,
    smoother: HeadingSmoother,
    last_fix: Option<LocationFix>,
    last_attitude_ts: Option<f64>,
    blocked: Vec<SensorKind>,
}

impl SampleFilter {
    pub fn new(config: &SensorConfig) -> Self {
        Self {
            distance_filter_m: config.distance_filter_m,
            min_attitude_interval_s: 1.0 / config.max_attitude_hz,
            smoother: HeadingSmoother::new(config.heading_smoothing_window),
            last_fix: None,
            last_attitude_ts: None,
            blocked: Vec::new(),
        }
    }

    /// Pass, drop or rewrite an event
    pub fn accept(&mut self, event: SensorEvent) -> Option<SensorEvent> {
        match event {
            SensorEvent::Location(fix) => self.accept_location(fix).map(SensorEvent::Location),
            SensorEvent::Attitude(att) => self.accept_attitude(att).map(SensorEvent::Attitude),
            SensorEvent::Status { sensor, status } => {
                if self.is_blocked(sensor) {
                    return None;
                }
                if status == SensorStatus::PermissionDenied {
                    self.blocked.push(sensor);
                }
                Some(event)
            }
        }
    }

    fn accept_location(&mut self, fix: LocationFix) -> Option<LocationFix> {
        if self.is_blocked(SensorKind::Location) || !fix.coordinate.is_valid() {
            return None;
        }
        let accept = match &self.last_fix {
            None => true,
            Some(last) => {
                let (_, moved) = bearing_and_distance(&last.coordinate, &fix.coordinate);
                moved >= self.distance_filter_m || fix.accuracy_m < last.accuracy_m * 0.5
            }
        };
        if accept {
            self.last_fix = Some(fix);
            Some(fix)
        } else {
            None
        }
    }

    fn accept_attitude(&mut self, att: Attitude) -> Option<Attitude> {
        if self.is_blocked(SensorKind::Heading) || !att.yaw_degrees.is_finite() {
            return None;
        }
        if let Some(last) = self.last_attitude_ts {
            let elapsed = att.timestamp_s - last;
            // Small tolerance so a sensor running exactly at the cap is not
            // decimated. A clock that steps back restarts the cap.
            if (0.0..self.min_attitude_interval_s * 0.95).contains(&elapsed) {
                return None;
            }
        }
        self.last_attitude_ts = Some(att.timestamp_s);

        let mut att = att;
        att.yaw_degrees = self.smoother.add(att.yaw_degrees);
        if self.is_blocked(SensorKind::Motion) {
            att.pitch_degrees = None;
            att.roll_degrees = None;
        }
        Some(att)
    }

    pub fn is_blocked(&self, kind: SensorKind) -> bool {
        self.blocked.contains(&kind)
    }
}
