use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded, select};

use super::{DeviceState, FrameObserver, OverlayStatus, SnapshotCell};
use crate::config::ArConfig;
use crate::error::{ArError, Result};
use crate::geo::PointOfInterest;
use crate::projection::{OverlayProjector, ProjectedMarker, TargetBearing, compute_targets};
use crate::sensor::{
    Attitude, SampleFilter, SensorEvent, SensorKind, SensorSampler, SensorSource, SensorStatus,
};

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Lifecycle of an [`OverlaySession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No sensor subscriptions, no output
    Stopped,
    /// Subscribed; a frame is produced on each accepted attitude sample
    Running,
}

/// Cancellation token for a running session
///
/// Safe to use from any thread, including from inside an observer callback.
/// Once cancelled, the worker delivers nothing further and exits after the
/// callback in progress returns.
#[derive(Debug, Clone)]
pub struct StopHandle {
    cancelled: Arc<AtomicBool>,
    wake: Sender<()>,
}

impl StopHandle {
    fn new() -> (Self, Receiver<()>) {
        let (wake, rx) = bounded(1);
        (
            Self {
                cancelled: Arc::new(AtomicBool::new(false)),
                wake,
            },
            rx,
        )
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let _ = self.wake.try_send(());
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

struct WorkerHandle {
    thread: JoinHandle<()>,
    stop: StopHandle,
}

/// Live AR overlay: sensors in, projected markers out
///
/// Sensor events are consumed on a dedicated worker thread that owns the
/// device state and the projector and runs the observer callbacks. The host
/// swaps the place list and reads the device state through snapshots.
pub struct OverlaySession {
    config: ArConfig,
    sampler: Arc<Mutex<SensorSampler>>,
    places: Arc<SnapshotCell<[PointOfInterest]>>,
    device: Arc<SnapshotCell<DeviceState>>,
    observer: Arc<Mutex<Box<dyn FrameObserver>>>,
    worker: Option<WorkerHandle>,
}

impl OverlaySession {
    pub fn new(
        config: ArConfig,
        location: Box<dyn SensorSource>,
        motion: Box<dyn SensorSource>,
        observer: Box<dyn FrameObserver>,
    ) -> Result<Self> {
        config.validate()?;
        let sampler = SensorSampler::new(&config.sensor, location, motion);
        Ok(Self {
            config,
            sampler: Arc::new(Mutex::new(sampler)),
            places: Arc::new(SnapshotCell::new(Arc::from(Vec::new()))),
            device: Arc::new(SnapshotCell::default()),
            observer: Arc::new(Mutex::new(observer)),
            worker: None,
        })
    }

    /// Replace the active place list
    ///
    /// The next frame uses the new list in full; a frame in progress finishes
    /// with the list it started with.
    pub fn set_points_of_interest(&self, places: Vec<PointOfInterest>) {
        log::debug!("Place list replaced ({} places)", places.len());
        self.places.store(Arc::from(places));
    }

    pub fn points_of_interest(&self) -> Arc<[PointOfInterest]> {
        self.places.load()
    }

    /// Latest device state published by the worker
    pub fn device_state(&self) -> Arc<DeviceState> {
        self.device.load()
    }

    pub fn state(&self) -> SessionState {
        if self.worker.is_some() {
            SessionState::Running
        } else {
            SessionState::Stopped
        }
    }

    pub fn config(&self) -> &ArConfig {
        &self.config
    }

    /// Token that cancels the current run, if running
    pub fn stop_handle(&self) -> Option<StopHandle> {
        self.worker.as_ref().map(|w| w.stop.clone())
    }

    /// Subscribe to the sensors and begin producing frames. No-op while running.
    pub fn start(&mut self) -> Result<()> {
        if let Some(worker) = &self.worker {
            if !worker.thread.is_finished() {
                return Ok(());
            }
            // Ended by its stop handle or by the sensor streams closing
            self.stop();
        }

        let events = {
            let mut sampler = lock(&self.sampler);
            sampler.start()?;
            sampler
                .events()
                .ok_or_else(|| ArError::SessionState("sampler has no event channel".into()))?
        };

        self.device.store(Arc::new(DeviceState::default()));
        let (stop, cancel_rx) = StopHandle::new();
        let worker = Worker {
            filter: SampleFilter::new(&self.config.sensor),
            projector: OverlayProjector::from_config(&self.config),
            state: DeviceState::default(),
            active_places: self.places.load(),
            places: Arc::clone(&self.places),
            device: Arc::clone(&self.device),
            sampler: Arc::clone(&self.sampler),
            observer: Arc::clone(&self.observer),
            targets: Vec::new(),
            frame: Vec::new(),
            last_status: None,
            stop: stop.clone(),
            cancel_rx,
            events,
        };

        let spawned = thread::Builder::new()
            .name("arview-session".into())
            .spawn(move || worker.run());
        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                lock(&self.sampler).stop();
                return Err(e.into());
            }
        };

        self.worker = Some(WorkerHandle { thread, stop });
        log::info!("Overlay session started");
        Ok(())
    }

    /// Unsubscribe and stop producing frames. No-op while stopped.
    ///
    /// When this returns (from any thread other than the worker) no observer
    /// callback is running and none will run until the next `start`.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        worker.stop.cancel();
        if thread::current().id() == worker.thread.thread().id() {
            log::debug!("stop() called on the session worker; exiting after this callback");
        } else if worker.thread.join().is_err() {
            log::warn!("Overlay worker panicked");
        }
        lock(&self.sampler).stop();
        log::info!("Overlay session stopped");
    }

    /// Block until the sensor streams end (or the run is cancelled), then stop
    pub fn wait(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.thread.join().is_err() {
                log::warn!("Overlay worker panicked");
            }
            lock(&self.sampler).stop();
            log::info!("Overlay session finished");
        }
    }
}

impl Drop for OverlaySession {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    filter: SampleFilter,
    projector: OverlayProjector,
    state: DeviceState,
    active_places: Arc<[PointOfInterest]>,
    places: Arc<SnapshotCell<[PointOfInterest]>>,
    device: Arc<SnapshotCell<DeviceState>>,
    sampler: Arc<Mutex<SensorSampler>>,
    observer: Arc<Mutex<Box<dyn FrameObserver>>>,
    targets: Vec<TargetBearing>,
    frame: Vec<ProjectedMarker>,
    last_status: Option<OverlayStatus>,
    stop: StopHandle,
    cancel_rx: Receiver<()>,
    events: Receiver<SensorEvent>,
}

impl Worker {
    fn run(mut self) {
        log::debug!("Overlay worker running");
        self.publish_status();

        let events = self.events.clone();
        let cancel_rx = self.cancel_rx.clone();
        while !self.stop.is_cancelled() {
            select! {
                recv(cancel_rx) -> _ => break,
                recv(events) -> msg => match msg {
                    Ok(event) => self.handle(event),
                    Err(_) => {
                        log::info!("Sensor streams closed");
                        break;
                    }
                },
            }
        }
        log::debug!("Overlay worker exiting");
    }

    fn handle(&mut self, event: SensorEvent) {
        let Some(event) = self.filter.accept(event) else {
            return;
        };

        match event {
            SensorEvent::Location(fix) => {
                log::trace!(
                    "Location {:.6},{:.6} ±{:.0}m",
                    fix.coordinate.latitude,
                    fix.coordinate.longitude,
                    fix.accuracy_m
                );
                self.state.location = Some(fix);
                self.sync_places();
                self.refresh_targets();
                self.publish_state();
                self.publish_status();
            }
            SensorEvent::Attitude(attitude) => {
                self.state.attitude = Some(attitude);
                self.publish_state();
                self.publish_status();
                self.deliver_frame(&attitude);
            }
            SensorEvent::Status { sensor, status } => {
                self.apply_sensor_status(sensor, status);
                self.publish_state();
                self.publish_status();
            }
        }
    }

    fn apply_sensor_status(&mut self, sensor: SensorKind, status: SensorStatus) {
        self.state.set_status(sensor, status);
        match status.check(sensor) {
            Ok(()) => log::info!("{} sensor available", sensor),
            Err(e @ ArError::PermissionDenied(_)) => {
                log::warn!("{}; sampling stopped", e);
                let denied: Vec<SensorKind> = SensorKind::ALL
                    .into_iter()
                    .filter(|&kind| self.state.status_of(kind) == SensorStatus::PermissionDenied)
                    .collect();
                lock(&self.sampler).stop_denied(&denied);
            }
            Err(e) => log::warn!("{}", e),
        }
    }

    fn sync_places(&mut self) {
        let places = self.places.load();
        if !Arc::ptr_eq(&places, &self.active_places) {
            self.active_places = places;
            self.refresh_targets();
        }
    }

    fn refresh_targets(&mut self) {
        match &self.state.location {
            Some(fix) => compute_targets(&self.active_places, &fix.coordinate, &mut self.targets),
            None => self.targets.clear(),
        }
    }

    fn deliver_frame(&mut self, attitude: &Attitude) {
        self.sync_places();
        if self.state.can_project() {
            self.projector
                .project_into(&self.active_places, &self.targets, attitude, &mut self.frame);
        } else {
            self.frame.clear();
        }

        if self.stop.is_cancelled() {
            return;
        }
        lock(&self.observer).on_attitude_frame(attitude, &self.frame);
    }

    fn publish_state(&self) {
        self.device.store(Arc::new(self.state.clone()));
    }

    fn publish_status(&mut self) {
        let status = self.state.overlay_status();
        if self.last_status == Some(status) {
            return;
        }
        self.last_status = Some(status);
        log::info!("Overlay status: {}", status);

        if self.stop.is_cancelled() {
            return;
        }
        lock(&self.observer).on_status(status);
    }
}
