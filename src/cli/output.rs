//! CLI output formatting

use crate::{
    core::{StepGraph, Target},
    execution::{ExecutionEvent, PipelineOutcome},
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a spinner shown while a step's command runs
pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Format an execution event for display
///
/// `StepStarted` and `StepOutput` render as `None`: the first is shown by
/// the spinner, the second by [`format_output`].
pub fn format_execution_event(event: &ExecutionEvent) -> Option<String> {
    let line = match event {
        ExecutionEvent::PipelineStarted { execution_id, root } => format!(
            "{} Starting pipeline at {} ({})",
            ROCKET,
            style(root).bold(),
            style(&execution_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::StepStarted { .. } | ExecutionEvent::StepOutput { .. } => return None,
        ExecutionEvent::StepSucceeded { step, next } => format!(
            "{} {} → {}",
            CHECK,
            style(step).green(),
            style(next).cyan()
        ),
        ExecutionEvent::StepFailed { step, reason, next } => format!(
            "{} {}: {} → {}",
            CROSS,
            style(step).red(),
            style(reason).dim(),
            style(next).cyan()
        ),
        ExecutionEvent::UnknownStepType {
            step,
            step_type,
            next,
        } => format!(
            "{} {}: unknown step type {} → {}",
            WARN,
            style(step).yellow(),
            style(step_type).bold(),
            style(next).cyan()
        ),
        ExecutionEvent::PipelineFinished {
            execution_id,
            terminal,
            result,
        } => format!(
            "{} Pipeline ({}) reached {} with result {}",
            INFO,
            style(&execution_id.to_string()[..8]).dim(),
            style(terminal).bold(),
            if *result {
                style("true").green()
            } else {
                style("false").red()
            }
        ),
    };
    Some(line)
}

/// Label for a running step
pub fn format_step_started(sequence: i64, step: &str, step_type: &str) -> String {
    format!(
        "{} Executing Step #{}: {} ({})",
        SPINNER,
        sequence,
        style(step).cyan(),
        step_type
    )
}

/// Format step output with truncation
pub fn format_output(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();

    if lines.len() <= max_lines {
        output.to_string()
    } else {
        let truncated = lines[..max_lines].join("\n");
        format!(
            "{}\n{}... ({} more lines)",
            truncated,
            style("[truncated]").dim(),
            lines.len() - max_lines
        )
    }
}

/// Format the compiled plan, one line per step in sequence order
pub fn format_plan(graph: &StepGraph) -> Vec<String> {
    let describe = |target: &Target| match target {
        Target::Step(_) => graph.target_name(target).to_string(),
        Target::End(terminal) => format!("{} ({})", terminal.name, terminal.result),
    };

    graph
        .nodes()
        .iter()
        .map(|node| {
            format!(
                "#{} {} ({}) success → {}, failure → {}",
                node.sequence,
                node.name,
                node.kind.type_name(),
                describe(&node.on_success),
                describe(&node.on_failure)
            )
        })
        .collect()
}

/// Format the final outcome
pub fn format_outcome(outcome: &PipelineOutcome) -> String {
    let elapsed = outcome
        .finished_at
        .signed_duration_since(outcome.started_at)
        .to_std()
        .unwrap_or_default();

    if outcome.success {
        format!(
            "{} Pipeline completed {} after {} step(s) in {:.1}s",
            CHECK,
            style("successfully").green(),
            outcome.executed_steps.len(),
            elapsed.as_secs_f64()
        )
    } else {
        format!(
            "{} Pipeline {} after {} step(s) in {:.1}s",
            CROSS,
            style("failed").red(),
            outcome.executed_steps.len(),
            elapsed.as_secs_f64()
        )
    }
}

/// Renders execution events on the console
pub struct ConsoleReporter {
    spinner: Mutex<Option<ProgressBar>>,
    max_output_lines: Option<usize>,
}

impl ConsoleReporter {
    pub fn new(max_output_lines: Option<usize>) -> Self {
        Self {
            spinner: Mutex::new(None),
            max_output_lines,
        }
    }

    pub fn handle(&self, event: &ExecutionEvent) {
        if let ExecutionEvent::StepStarted {
            sequence,
            step,
            step_type,
        } = event
        {
            self.start_spinner(format_step_started(*sequence, step, step_type));
            return;
        }

        self.finish_spinner();

        if let ExecutionEvent::StepOutput { output, .. } = event {
            if !output.trim().is_empty() {
                match self.max_output_lines {
                    Some(max) => println!("{}", format_output(output.trim_end(), max)),
                    None => println!("{}", output.trim_end()),
                }
            }
            return;
        }

        if let Some(line) = format_execution_event(event) {
            println!("{}", line);
        }
    }

    fn start_spinner(&self, message: String) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(previous) = slot.take() {
                previous.finish_and_clear();
            }
            *slot = Some(create_spinner(message));
        }
    }

    fn finish_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(spinner) = slot.take() {
                let message = spinner.message();
                spinner.finish_and_clear();
                println!("{}", message);
            }
        }
    }
}
