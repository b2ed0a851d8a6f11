//! Test utility functions for nodecd scenarios

use async_trait::async_trait;
use nodecd::core::PipelineConfig;
use nodecd::execution::{ExecutionEngine, ExecutionEvent, PipelineOutcome, StepExecutor};
use nodecd::runner::{CommandOutput, CommandRunner, ManifestError, RunnerError, ScriptManifest};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Mock runner with a scripted result per command
///
/// Commands without a scripted result succeed with empty output.
#[derive(Default)]
pub struct MockRunner {
    results: HashMap<String, CommandOutput>,
    calls: Mutex<Vec<String>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `command` exit with code 1 and write to stderr
    pub fn failing(mut self, command: &str) -> Self {
        self.results.insert(
            command.to_string(),
            CommandOutput {
                stdout: String::new(),
                stderr: format!("{} failed", command),
                exit_code: Some(1),
            },
        );
        self
    }

    /// Make `command` exit cleanly but write to stderr
    pub fn noisy(mut self, command: &str) -> Self {
        self.results.insert(
            command.to_string(),
            CommandOutput {
                stdout: format!("{} done", command),
                stderr: "warning: something looks off".to_string(),
                exit_code: Some(0),
            },
        );
        self
    }

    pub fn with_output(mut self, command: &str, stdout: &str) -> Self {
        self.results
            .insert(command.to_string(), CommandOutput::success(stdout));
        self
    }

    /// Commands in the order they were run
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, command: &str) -> Result<CommandOutput, RunnerError> {
        self.calls.lock().unwrap().push(command.to_string());
        Ok(self
            .results
            .get(command)
            .cloned()
            .unwrap_or_else(|| CommandOutput::success("")))
    }
}

/// In-memory package manifest that counts lookups
#[derive(Default)]
pub struct SpyManifest {
    scripts: HashMap<String, String>,
    lookups: Mutex<Vec<String>>,
}

impl SpyManifest {
    pub fn new(scripts: &[(&str, &str)]) -> Self {
        Self {
            scripts: scripts
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScriptManifest for SpyManifest {
    async fn lookup_script(&self, name: &str) -> Result<String, ManifestError> {
        self.lookups.lock().unwrap().push(name.to_string());
        self.scripts
            .get(name)
            .cloned()
            .ok_or_else(|| ManifestError::MissingScript {
                name: name.to_string(),
                path: PathBuf::from("package.json"),
            })
    }
}

/// Test result from running a pipeline
pub struct PipelineTestResult {
    pub outcome: PipelineOutcome,
    pub events: Vec<ExecutionEvent>,
}

impl PipelineTestResult {
    pub fn is_success(&self) -> bool {
        self.outcome.success
    }

    pub fn executed_steps(&self) -> Vec<&str> {
        self.outcome.executed_steps.iter().map(String::as_str).collect()
    }

    /// Sequence numbers announced by `StepStarted`, in run order
    pub fn announced_sequences(&self) -> Vec<(String, i64)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ExecutionEvent::StepStarted { sequence, step, .. } => {
                    Some((step.clone(), *sequence))
                }
                _ => None,
            })
            .collect()
    }

    /// Output captured from a successful step
    pub fn step_output(&self, step: &str) -> Option<&str> {
        self.events.iter().find_map(|e| match e {
            ExecutionEvent::StepOutput { step: s, output } if s == step => Some(output.as_str()),
            _ => None,
        })
    }

    /// Failure reason of a step
    pub fn step_failure(&self, step: &str) -> Option<&str> {
        self.events.iter().find_map(|e| match e {
            ExecutionEvent::StepFailed {
                step: s, reason, ..
            } if s == step => Some(reason.as_str()),
            _ => None,
        })
    }
}

/// Parse, compile and run a pipeline with the given collaborators
pub async fn run_pipeline_with_mocks(
    yaml: &str,
    runner: Arc<MockRunner>,
    manifest: Arc<SpyManifest>,
) -> PipelineTestResult {
    let config = PipelineConfig::from_yaml(yaml)
        .unwrap_or_else(|e| panic!("Failed to parse pipeline YAML: {}", e));
    let graph = config
        .to_graph()
        .unwrap_or_else(|e| panic!("Failed to compile pipeline: {}", e));

    let executor = StepExecutor::new(runner, manifest).with_stderr_policy(config.stderr);
    let mut engine = ExecutionEngine::new(executor);

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    engine.add_event_handler(move |event| sink.lock().unwrap().push(event));

    let outcome = engine.execute(&graph).await;
    let events = events.lock().unwrap().clone();

    PipelineTestResult { outcome, events }
}

/// Assert the pipeline ended on a true terminal
pub fn assert_pipeline_succeeded(result: &PipelineTestResult) {
    assert!(
        result.is_success(),
        "Pipeline should have succeeded, ran {:?} and ended at {}",
        result.outcome.executed_steps,
        result.outcome.terminal
    );
    assert_eq!(result.outcome.exit_code(), 0);
}

/// Assert the pipeline ended on a false terminal
pub fn assert_pipeline_failed(result: &PipelineTestResult) {
    assert!(
        !result.is_success(),
        "Pipeline should have failed, ran {:?} and ended at {}",
        result.outcome.executed_steps,
        result.outcome.terminal
    );
    assert_eq!(result.outcome.exit_code(), 1);
}
