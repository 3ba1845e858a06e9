use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{RecvTimeoutError, Sender, bounded, select};

use super::{SensorEvent, SensorKind, SensorSource};
use crate::error::{ArError, Result};

/// Recorded sensor track
///
/// Stored as JSON lines, one [`SensorEvent`] per line. Blank lines and lines
/// starting with `#` are ignored.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    events: Vec<SensorEvent>,
}

impl Recording {
    pub fn new(events: Vec<SensorEvent>) -> Self {
        Self { events }
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut events = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let event: SensorEvent = serde_json::from_str(line)
                .map_err(|e| ArError::Parse(format!("line {}: {}", lineno + 1, e)))?;
            events.push(event);
        }
        Ok(Self { events })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    pub fn to_json_lines(&self) -> Result<String> {
        let mut out = String::new();
        for event in &self.events {
            let line = serde_json::to_string(event).map_err(|e| ArError::Parse(e.to_string()))?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json_lines()?)?;
        Ok(())
    }

    pub fn events(&self) -> &[SensorEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the earliest timed event, shared by both replay streams
    pub fn start_time(&self) -> Option<f64> {
        self.events
            .iter()
            .filter_map(SensorEvent::timestamp_s)
            .reduce(f64::min)
    }

    /// Replay of every event as one ordered stream
    ///
    /// Unlike a location/motion pair, fixes and attitude samples can never
    /// overtake each other, which keeps unpaced replays deterministic.
    pub fn merged_source(&self, speed: f64) -> ReplaySource {
        self.stream_source("replay", speed, |_| true)
    }

    /// Replay of the location stream (fixes and location status)
    pub fn location_source(&self, speed: f64) -> ReplaySource {
        self.stream_source("replay-location", speed, |e| e.is_location_stream())
    }

    /// Replay of the motion stream (attitude plus heading/motion status)
    pub fn motion_source(&self, speed: f64) -> ReplaySource {
        self.stream_source("replay-motion", speed, |e| !e.is_location_stream())
    }

    fn stream_source(
        &self,
        name: &str,
        speed: f64,
        keep: impl Fn(&SensorEvent) -> bool,
    ) -> ReplaySource {
        let events: Vec<SensorEvent> = self.events.iter().copied().filter(|e| keep(e)).collect();
        ReplaySource::new(name, events, self.start_time().unwrap_or(0.0), speed)
    }
}

/// Plays recorded events from a background thread
///
/// With `speed > 0` events are paced to their recorded timestamps divided by
/// `speed`; with `speed == 0` they are delivered as fast as the consumer
/// takes them.
pub struct ReplaySource {
    name: String,
    events: Arc<[SensorEvent]>,
    start_time: f64,
    speed: f64,
    kinds: Vec<SensorKind>,
    worker: Option<(JoinHandle<()>, Sender<()>)>,
}

impl ReplaySource {
    pub fn new(
        name: impl Into<String>,
        events: Vec<SensorEvent>,
        start_time: f64,
        speed: f64,
    ) -> Self {
        let mut kinds = Vec::new();
        for event in &events {
            let kind = match event {
                SensorEvent::Location(_) => SensorKind::Location,
                SensorEvent::Attitude(_) => SensorKind::Heading,
                SensorEvent::Status { .. } => continue,
            };
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Self {
            name: name.into(),
            events: events.into(),
            start_time,
            speed,
            kinds,
            worker: None,
        }
    }

    /// True while the replay thread still has events to deliver
    pub fn is_playing(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|(handle, _)| !handle.is_finished())
    }
}

impl SensorSource for ReplaySource {
    fn start(&mut self, tx: Sender<SensorEvent>) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let events = Arc::clone(&self.events);
        let start_time = self.start_time;
        let speed = self.speed;
        let name = self.name.clone();

        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let started = Instant::now();
                let mut last_ts = start_time;
                for event in events.iter() {
                    let ts = event.timestamp_s().unwrap_or(last_ts);
                    last_ts = ts;

                    if speed > 0.0 {
                        let due = Duration::from_secs_f64(((ts - start_time) / speed).max(0.0));
                        if let Some(wait) = due.checked_sub(started.elapsed()) {
                            match stop_rx.recv_timeout(wait) {
                                Err(RecvTimeoutError::Timeout) => {}
                                _ => return,
                            }
                        }
                    }

                    select! {
                        send(tx, *event) -> res => {
                            if res.is_err() {
                                log::debug!("{}: receiver dropped", name);
                                return;
                            }
                        }
                        recv(stop_rx) -> _ => return,
                    }
                }
                log::debug!("{}: replay finished ({} events)", name, events.len());
            })?;

        self.worker = Some((handle, stop_tx));
        Ok(())
    }

    fn stop(&mut self) {
        if let Some((handle, stop_tx)) = self.worker.take() {
            drop(stop_tx);
            if handle.join().is_err() {
                log::warn!("{}: replay thread panicked", self.name);
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kinds(&self) -> Option<&[SensorKind]> {
        Some(&self.kinds)
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.stop();
    }
}
