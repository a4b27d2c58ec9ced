pub mod adjustment;
pub mod beats;
pub mod error;
pub mod io;
pub mod tempo;

pub use crate::adjustment::{adjust, AdjustmentReport, AdjustmentResult};
pub use crate::beats::{remap, BeatSequence};
pub use crate::error::DomainError;
pub use crate::io::{ExportFormat, ReportExporter};
pub use crate::tempo::{resolve, Resolution, TempoEstimate, TempoHypothesis};
