pub mod config;
pub mod constants;
pub mod error;
pub mod geo;
pub mod output;
pub mod overlay;
pub mod projection;
pub mod sensor;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::ArConfig;
pub use error::{ArError, Result};
pub use overlay::{FrameObserver, OverlaySession, OverlayStatus};
pub use projection::{OverlayProjector, ProjectedMarker, ScreenPosition};
