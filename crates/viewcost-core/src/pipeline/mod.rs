pub mod config;
mod orchestrator;
mod types;

pub use orchestrator::{clip_status, run_batch, run_clip};
pub use types::{
    ClipReport, ClipStatus, NoOpReporter, PipelineStage, ProgressReporter, StageReport, UnitFailure,
};
