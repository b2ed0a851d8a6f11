//! Core domain models for the pipeline
//!
//! This module defines the configuration model, the typed step records
//! and the compiled step graph the execution engine walks.

pub mod config;
pub mod error;
pub mod graph;
pub mod step;

pub use config::{PipelineConfig, StderrPolicy};
pub use error::ConfigError;
pub use graph::{NodeId, StepGraph, StepNode, Target, Terminal};
pub use step::{StepKind, StepRecord, StepRegistry, TestCommand};
