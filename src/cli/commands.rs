//! CLI command definitions

use clap::Args;

/// Run the pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Print the outcome as JSON when the pipeline finishes
    #[arg(long)]
    pub json: bool,

    /// Truncate step output to this many lines
    #[arg(long)]
    pub max_output_lines: Option<usize>,
}

/// Validate the pipeline configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Output the parsed configuration in JSON format
    #[arg(long)]
    pub json: bool,
}
