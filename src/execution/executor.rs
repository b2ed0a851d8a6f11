//! Step executor - runs the command behind a single step

use crate::{
    core::{StderrPolicy, StepKind, StepNode, TestCommand},
    runner::{CommandRunner, ScriptManifest},
};
use tracing::{debug, warn};

/// Result of executing a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Command finished cleanly; carries its stdout
    Success { output: String },
    /// Manifest lookup or command failed
    Failure { reason: String },
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success { .. })
    }
}

/// Executes a single step
///
/// Handlers never fail past this boundary: every problem becomes a
/// [`StepOutcome::Failure`], which the engine turns into the failure edge.
pub struct StepExecutor<R, M> {
    runner: R,
    manifest: M,
    stderr_policy: StderrPolicy,
}

impl<R: CommandRunner, M: ScriptManifest> StepExecutor<R, M> {
    pub fn new(runner: R, manifest: M) -> Self {
        Self {
            runner,
            manifest,
            stderr_policy: StderrPolicy::default(),
        }
    }

    pub fn with_stderr_policy(mut self, policy: StderrPolicy) -> Self {
        self.stderr_policy = policy;
        self
    }

    /// Execute a step and return the result
    pub async fn execute(&self, step: &StepNode) -> StepOutcome {
        match &step.kind {
            StepKind::BuildScript { script_name } => self.run_script(step, script_name).await,
            StepKind::Test(TestCommand::Command(command)) => self.run_command(step, command).await,
            StepKind::Test(TestCommand::Script(script_name)) => {
                self.run_script(step, script_name).await
            }
            StepKind::TypeScriptBuild { config } => {
                self.run_command(step, &format!("tsc -p {}", config)).await
            }
            StepKind::End { .. } | StepKind::Unknown { .. } => {
                let reason = format!("No handler for step type {}", step.kind.type_name());
                warn!("{} ({})", reason, step.name);
                StepOutcome::Failure { reason }
            }
        }
    }

    async fn run_script(&self, step: &StepNode, script_name: &str) -> StepOutcome {
        let command = match self.manifest.lookup_script(script_name).await {
            Ok(command) => command,
            Err(e) => {
                warn!("Error while reading manifest in {}: {}", step.name, e);
                return StepOutcome::Failure {
                    reason: e.to_string(),
                };
            }
        };

        self.run_command(step, &command).await
    }

    async fn run_command(&self, step: &StepNode, command: &str) -> StepOutcome {
        debug!("Step {} runs `{}`", step.name, command);

        let output = match self.runner.run(command).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Error while executing {}: {}", step.name, e);
                return StepOutcome::Failure {
                    reason: e.to_string(),
                };
            }
        };

        if !output.exited_cleanly() {
            let reason = match output.exit_code {
                Some(code) => format!(
                    "`{}` exited with code {}: {}",
                    command,
                    code,
                    output.stderr.trim()
                ),
                None => format!("`{}` was terminated by a signal", command),
            };
            warn!("Error while executing {}: {}", step.name, reason);
            return StepOutcome::Failure { reason };
        }

        if self.stderr_policy == StderrPolicy::Fail && output.has_stderr() {
            let reason = format!("`{}` wrote to stderr: {}", command, output.stderr.trim());
            warn!("Error while executing {}: {}", step.name, reason);
            return StepOutcome::Failure { reason };
        }

        StepOutcome::Success {
            output: output.stdout,
        }
    }
}
