use std::sync::{Arc, Mutex};

use crossbeam_channel::{Sender, TrySendError};

use super::{Attitude, LocationFix, SensorEvent, SensorKind, SensorStatus};
use crate::error::Result;

/// A stream of sensor events
///
/// `start` hands the source the channel it must deliver into; after `stop`
/// returns the source must not send anything further. Both calls may be
/// repeated.
pub trait SensorSource: Send {
    fn start(&mut self, tx: Sender<SensorEvent>) -> Result<()>;
    fn stop(&mut self);
    fn name(&self) -> &str;

    /// Sensors whose samples this source delivers: `Location` for fixes,
    /// `Heading` for attitude. `None` means the sampler assumes the kinds of
    /// the slot the source was given.
    fn kinds(&self) -> Option<&[SensorKind]> {
        None
    }
}

type Sink = Arc<Mutex<Option<Sender<SensorEvent>>>>;

/// Host-driven source
///
/// Platform glue (a location-manager delegate, a motion-update handler)
/// pushes samples through the paired [`SensorFeed`]. Samples pushed while the
/// source is stopped are dropped.
pub struct ChannelSource {
    name: String,
    sink: Sink,
}

/// Cloneable handle used by the host to push samples into a [`ChannelSource`]
#[derive(Clone)]
pub struct SensorFeed {
    sink: Sink,
}

impl ChannelSource {
    pub fn new(name: impl Into<String>) -> (Self, SensorFeed) {
        let sink: Sink = Arc::new(Mutex::new(None));
        let feed = SensorFeed {
            sink: Arc::clone(&sink),
        };
        (
            Self {
                name: name.into(),
                sink,
            },
            feed,
        )
    }
}

impl SensorSource for ChannelSource {
    fn start(&mut self, tx: Sender<SensorEvent>) -> Result<()> {
        *self.sink.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);
        Ok(())
    }

    fn stop(&mut self) {
        self.sink.lock().unwrap_or_else(|e| e.into_inner()).take();
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl SensorFeed {
    /// Push an event. Returns false when the source is stopped or the
    /// session is not keeping up.
    pub fn push(&self, event: SensorEvent) -> bool {
        let guard = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        let Some(tx) = guard.as_ref() else {
            return false;
        };
        match tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::warn!("Sensor channel full, dropping {:?}", event);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    pub fn push_location(&self, fix: LocationFix) -> bool {
        self.push(SensorEvent::Location(fix))
    }

    pub fn push_attitude(&self, attitude: Attitude) -> bool {
        self.push(SensorEvent::Attitude(attitude))
    }

    pub fn push_status(&self, sensor: SensorKind, status: SensorStatus) -> bool {
        self.push(SensorEvent::Status { sensor, status })
    }

    /// True while the paired source is started
    pub fn is_active(&self) -> bool {
        self.sink.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }
}
