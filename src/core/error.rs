//! Configuration errors
//!
//! Everything in here is fatal: a pipeline with a configuration error
//! never starts running steps.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating, parsing or compiling a pipeline configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration was not found (searched: {})", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("Failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("No root step was configured")]
    MissingRoot,

    #[error("Root step \"{0}\" was not found in your configuration")]
    RootNotFound(String),

    #[error("Step \"{step}\" has success step \"{target}\" which does not exist")]
    MissingSuccessStep { step: String, target: String },

    #[error("Step \"{step}\" has failure step \"{failure}\" (resolved to \"{target}\") which does not exist")]
    MissingFailureStep {
        step: String,
        failure: String,
        target: String,
    },

    #[error("Cycle detected between steps: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("Step \"{step}\" is invalid: {message}")]
    InvalidStep { step: String, message: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
