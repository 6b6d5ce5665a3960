//! Speech generation: engine orchestration for single texts and batches.

mod language;
mod orchestrator;

pub use language::Language;
pub use orchestrator::{
    BatchFailure, BatchReport, DEFAULT_OUTPUT_DIR, GenerationRequest, SynthError,
    SynthesisOrchestrator,
};
