//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{RunCommand, ValidateCommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Declarative build/test pipeline runner
#[derive(Debug, Parser, Clone)]
#[command(name = "nodecd")]
#[command(author = "nodecd Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Runs the build/test pipeline described in nodecd.yaml", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to pipeline configuration file (skips discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Working directory for discovery and commands
    #[arg(short = 'C', long = "directory", global = true)]
    pub directory: Option<PathBuf>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the pipeline
    Run(RunCommand),

    /// Validate the pipeline configuration and print the compiled plan
    Validate(ValidateCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
