//! Pipeline configuration from YAML

use crate::core::{error::ConfigError, graph::StepGraph, step::StepRegistry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up during discovery
pub const CONFIG_FILENAME: &str = "nodecd.yaml";

/// Directories searched for the configuration file, in priority order
pub const SEARCH_DIRS: &[&str] = &[".", "github", ".vscode", "config"];

pub const DEFAULT_MANIFEST: &str = "./package.json";

/// Top-level pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Name of the step the pipeline starts with
    #[serde(default)]
    pub root: String,

    /// Pipeline steps
    #[serde(default)]
    pub steps: Vec<StepConfig>,

    /// Path to the script manifest (package.json)
    #[serde(default)]
    pub manifest: Option<PathBuf>,

    /// How stderr output of a command is judged
    #[serde(default)]
    pub stderr: StderrPolicy,
}

/// Step configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepConfig {
    /// Unique step name
    pub name: String,

    /// Step type tag (BuildScript, TypeScriptBuild, Test, End)
    #[serde(rename = "type")]
    pub step_type: String,

    /// Next step on success, or "end"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,

    /// Next step on failure, "end", or "continue"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,

    /// Manifest script name (BuildScript, Test)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_name: Option<String>,

    /// Explicit command (Test)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Compiler project file (TypeScriptBuild)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,

    /// Pipeline result (End)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<bool>,
}

/// Whether any stderr output counts as a failed command
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StderrPolicy {
    /// Non-empty stderr fails the step, even with a zero exit status
    #[default]
    Fail,
    /// Only the exit status decides
    Ignore,
}

impl PipelineConfig {
    /// Find the configuration file below `base`
    pub fn discover<P: AsRef<Path>>(base: P) -> Result<PathBuf, ConfigError> {
        let base = base.as_ref();
        let mut searched = Vec::with_capacity(SEARCH_DIRS.len());

        for dir in SEARCH_DIRS {
            let candidate = base.join(dir).join(CONFIG_FILENAME);
            if candidate.is_file() {
                debug!("Found configuration at {}", candidate.display());
                return Ok(candidate);
            }
            searched.push(candidate);
        }

        Err(ConfigError::NotFound { searched })
    }

    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse pipeline configuration from a YAML (or JSON) string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Manifest path, resolved against the working directory
    pub fn manifest_path(&self, working_dir: &Path) -> PathBuf {
        let manifest = self
            .manifest
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST));
        working_dir.join(manifest)
    }

    /// Typed step records
    pub fn registry(&self) -> Result<StepRegistry, ConfigError> {
        StepRegistry::from_configs(&self.steps)
    }

    /// Compile the configuration into an executable step graph
    pub fn to_graph(&self) -> Result<StepGraph, ConfigError> {
        StepGraph::compile(&self.root, &self.registry()?)
    }
}
