pub mod observer;
pub mod session;
pub mod snapshot;
pub mod state;

pub use observer::{FrameObserver, OverlayStatus};
pub use session::{OverlaySession, SessionState, StopHandle};
pub use snapshot::SnapshotCell;
pub use state::DeviceState;
