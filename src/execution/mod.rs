//! Pipeline execution engine

pub mod engine;
pub mod executor;

pub use engine::{EventHandler, ExecutionEngine, ExecutionEvent, PipelineOutcome};
pub use executor::{StepExecutor, StepOutcome};
