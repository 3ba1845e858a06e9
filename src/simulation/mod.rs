mod track;

pub use track::{SimulatedSource, TrackConfig, destination, simulate_track};
