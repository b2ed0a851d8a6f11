//! nodecd - a declarative build/test pipeline runner

pub mod cli;
pub mod core;
pub mod execution;
pub mod runner;

// Re-export commonly used types
pub use core::{ConfigError, PipelineConfig, StepGraph, StepKind, StepNode, Target};
pub use execution::{ExecutionEngine, ExecutionEvent, PipelineOutcome, StepExecutor, StepOutcome};
pub use runner::{CommandRunner, PackageManifest, ScriptManifest, ShellRunner};
