pub mod config;
pub mod pipeline;
pub mod tracker;

pub use config::{Bounds, PolicyError, RetempoConfig};
pub use pipeline::{RetempoJob, RetempoOutputs, RetempoPipeline};
pub use tracker::{BeatFileTracker, BeatTracker, FixedBeats, TrackedBeats};
