//! Main execution engine - walks the step graph until a terminal is reached

use crate::{
    core::{StepGraph, StepKind, Target},
    execution::{StepExecutor, StepOutcome},
    runner::{CommandRunner, ScriptManifest},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events that can occur during pipeline execution
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PipelineStarted {
        execution_id: Uuid,
        root: String,
    },
    StepStarted {
        sequence: i64,
        step: String,
        step_type: String,
    },
    StepOutput {
        step: String,
        output: String,
    },
    StepSucceeded {
        step: String,
        next: String,
    },
    StepFailed {
        step: String,
        reason: String,
        next: String,
    },
    UnknownStepType {
        step: String,
        step_type: String,
        next: String,
    },
    PipelineFinished {
        execution_id: Uuid,
        terminal: String,
        result: bool,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Final result of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub execution_id: Uuid,

    /// Result carried by the terminal that ended the run
    pub success: bool,

    /// Name of that terminal
    pub terminal: String,

    /// Steps in the order they ran
    pub executed_steps: Vec<String>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PipelineOutcome {
    /// Process exit status for this outcome
    pub fn exit_code(&self) -> u8 {
        if self.success {
            0
        } else {
            1
        }
    }
}

/// Main pipeline execution engine
///
/// Steps run one at a time; a step's command has finished before the
/// next step is chosen. There is no step budget and no timeout.
pub struct ExecutionEngine<R, M> {
    executor: StepExecutor<R, M>,
    event_handlers: Vec<EventHandler>,
}

impl<R: CommandRunner, M: ScriptManifest> ExecutionEngine<R, M> {
    pub fn new(executor: StepExecutor<R, M>) -> Self {
        Self {
            executor,
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Execute the pipeline from its root until a terminal is reached
    pub async fn execute(&self, graph: &StepGraph) -> PipelineOutcome {
        let execution_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut executed_steps = Vec::new();

        info!(
            "Starting pipeline execution: {} ({})",
            graph.target_name(graph.root()),
            execution_id
        );
        self.emit_event(ExecutionEvent::PipelineStarted {
            execution_id,
            root: graph.target_name(graph.root()).to_string(),
        });

        let mut current = graph.root();
        loop {
            let id = match current {
                Target::End(terminal) => {
                    info!("Pipeline has finished running. Result: {}", terminal.result);
                    self.emit_event(ExecutionEvent::PipelineFinished {
                        execution_id,
                        terminal: terminal.name.clone(),
                        result: terminal.result,
                    });
                    return PipelineOutcome {
                        execution_id,
                        success: terminal.result,
                        terminal: terminal.name.clone(),
                        executed_steps,
                        started_at,
                        finished_at: Utc::now(),
                    };
                }
                Target::Step(id) => *id,
            };

            let node = graph.node(id);
            info!(
                "Executing Step #{}: {} ({})",
                node.sequence,
                node.name,
                node.kind.type_name()
            );
            self.emit_event(ExecutionEvent::StepStarted {
                sequence: node.sequence,
                step: node.name.clone(),
                step_type: node.kind.type_name().to_string(),
            });
            executed_steps.push(node.name.clone());

            if let StepKind::Unknown { type_tag } = &node.kind {
                warn!("Unknown step type: {} (step {})", type_tag, node.name);
                self.emit_event(ExecutionEvent::UnknownStepType {
                    step: node.name.clone(),
                    step_type: type_tag.clone(),
                    next: graph.target_name(&node.on_failure).to_string(),
                });
                current = &node.on_failure;
                continue;
            }

            current = match self.executor.execute(node).await {
                StepOutcome::Success { output } => {
                    self.emit_event(ExecutionEvent::StepOutput {
                        step: node.name.clone(),
                        output,
                    });
                    self.emit_event(ExecutionEvent::StepSucceeded {
                        step: node.name.clone(),
                        next: graph.target_name(&node.on_success).to_string(),
                    });
                    &node.on_success
                }
                StepOutcome::Failure { reason } => {
                    self.emit_event(ExecutionEvent::StepFailed {
                        step: node.name.clone(),
                        reason,
                        next: graph.target_name(&node.on_failure).to_string(),
                    });
                    &node.on_failure
                }
            };
        }
    }
}
