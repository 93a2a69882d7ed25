// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod orchestrator;
mod progress;
mod stage;

pub use orchestrator::{Narration, NarrationKind, PipelineOrchestrator, PipelineOutcome};
pub use progress::{PipelineStats, ProgressTracker};
pub use stage::Stage;
