pub mod replay;
pub mod sample;
pub mod sampler;
pub mod smoothing;
pub mod source;

pub use replay::{Recording, ReplaySource};
pub use sample::{Attitude, LocationFix, SensorEvent, SensorKind, SensorStatus};
pub use sampler::{SampleFilter, SensorSampler};
pub use smoothing::HeadingSmoother;
pub use source::{ChannelSource, SensorFeed, SensorSource};
