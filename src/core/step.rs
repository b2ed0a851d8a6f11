//! Step domain model

use crate::core::{config::StepConfig, error::ConfigError};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Sentinel accepted by `success` and `failure` (case-insensitive)
pub const END: &str = "end";

/// Sentinel accepted by `failure` to reuse the success route
pub const CONTINUE: &str = "continue";

pub const DEFAULT_BUILD_SCRIPT: &str = "build";
pub const DEFAULT_TEST_SCRIPT: &str = "test";
pub const DEFAULT_TSCONFIG: &str = "./tsconfig.json";

/// The work a step performs, with only the fields that kind uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    /// Run a script from the package manifest
    BuildScript { script_name: String },

    /// Run the TypeScript compiler against a project config
    TypeScriptBuild { config: String },

    /// Run a test command or manifest script
    Test(TestCommand),

    /// Authored terminal with a fixed pipeline result
    End { result: bool },

    /// Any type tag this runner does not know about
    Unknown { type_tag: String },
}

/// How a test step finds its command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestCommand {
    /// Explicit shell command
    Command(String),
    /// Script name looked up in the package manifest
    Script(String),
}

impl StepKind {
    /// Type tag as it is written in the configuration
    pub fn type_name(&self) -> &str {
        match self {
            StepKind::BuildScript { .. } => "BuildScript",
            StepKind::TypeScriptBuild { .. } => "TypeScriptBuild",
            StepKind::Test(_) => "Test",
            StepKind::End { .. } => "End",
            StepKind::Unknown { type_tag } => type_tag,
        }
    }
}

/// Where a step goes next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    /// Finish the pipeline with the edge's default result
    End,
    /// Continue with the named step
    Named(String),
}

impl NextStep {
    fn parse(value: Option<&str>) -> Self {
        match value {
            None => NextStep::End,
            Some(v) if v.eq_ignore_ascii_case(END) => NextStep::End,
            Some(v) => NextStep::Named(v.to_string()),
        }
    }
}

/// Failure transition as authored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureRoute {
    Next(NextStep),
    /// Follow the success transition on failure too
    Continue,
}

impl FailureRoute {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some(CONTINUE) => FailureRoute::Continue,
            other => FailureRoute::Next(NextStep::parse(other)),
        }
    }
}

/// A named step with typed transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub name: String,
    pub kind: StepKind,
    pub success: NextStep,
    pub failure: FailureRoute,

    /// The failure value as written, kept for error messages
    pub failure_raw: Option<String>,
}

impl StepRecord {
    /// Create a step record from a step config, applying per-type defaults
    pub fn from_config(config: &StepConfig) -> Result<Self, ConfigError> {
        let kind = match config.step_type.as_str() {
            "BuildScript" => StepKind::BuildScript {
                script_name: config
                    .script_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_BUILD_SCRIPT.to_string()),
            },
            "TypeScriptBuild" => StepKind::TypeScriptBuild {
                config: config
                    .config
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TSCONFIG.to_string()),
            },
            "Test" => StepKind::Test(match &config.command {
                Some(command) => TestCommand::Command(command.clone()),
                None => TestCommand::Script(
                    config
                        .script_name
                        .clone()
                        .unwrap_or_else(|| DEFAULT_TEST_SCRIPT.to_string()),
                ),
            }),
            "End" => match config.result {
                Some(result) => StepKind::End { result },
                None => {
                    return Err(ConfigError::InvalidStep {
                        step: config.name.clone(),
                        message: "End steps need a boolean `result`".to_string(),
                    })
                }
            },
            other => StepKind::Unknown {
                type_tag: other.to_string(),
            },
        };

        Ok(StepRecord {
            name: config.name.clone(),
            kind,
            success: NextStep::parse(config.success.as_deref()),
            failure: FailureRoute::parse(config.failure.as_deref()),
            failure_raw: config.failure.clone(),
        })
    }

    /// The failure transition after substituting `continue`
    pub fn effective_failure(&self) -> &NextStep {
        match &self.failure {
            FailureRoute::Next(next) => next,
            FailureRoute::Continue => &self.success,
        }
    }
}

/// Flat, ordered collection of step records
#[derive(Debug, Clone, Default)]
pub struct StepRegistry {
    records: Vec<StepRecord>,
    /// Name to position of its first definition
    index: HashMap<String, usize>,
}

impl StepRegistry {
    pub fn new(records: Vec<StepRecord>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        let mut reported = HashSet::new();
        for (position, record) in records.iter().enumerate() {
            if let Entry::Vacant(slot) = index.entry(record.name.clone()) {
                slot.insert(position);
            } else if reported.insert(record.name.as_str()) {
                warn!(
                    "Step name \"{}\" is defined more than once; the first definition is used",
                    record.name
                );
            }
        }

        Self { records, index }
    }

    /// Build a registry from step configs
    pub fn from_configs(configs: &[StepConfig]) -> Result<Self, ConfigError> {
        let records = configs
            .iter()
            .map(StepRecord::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(records))
    }

    /// First record with the given name
    pub fn find(&self, name: &str) -> Option<&StepRecord> {
        self.index.get(name).map(|&position| &self.records[position])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
