use anyhow::{Context, Result};
use nodecd::cli::commands::{RunCommand, ValidateCommand};
use nodecd::cli::output::*;
use nodecd::cli::{Cli, Command};
use nodecd::core::{ConfigError, PipelineConfig, StepGraph};
use nodecd::execution::{ExecutionEngine, StepExecutor};
use nodecd::runner::{PackageManifest, ShellRunner};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Exit status for configuration and other fatal errors
const EXIT_FATAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set logging subscriber: {}", e);
    }

    let result = match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd, &cli).await,
        Command::Validate(cmd) => validate_pipeline(cmd, &cli),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            println!("{} {}", CROSS, style(format!("{:#}", e)).red());
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn working_dir(cli: &Cli) -> Result<PathBuf> {
    match &cli.directory {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().context("Failed to determine working directory"),
    }
}

fn load_config(cli: &Cli, working_dir: &Path) -> Result<(PathBuf, PipelineConfig), ConfigError> {
    let path = match &cli.config {
        Some(path) => working_dir.join(path),
        None => PipelineConfig::discover(working_dir)?,
    };
    let config = PipelineConfig::from_file(&path)?;
    Ok((path, config))
}

fn load_graph(cli: &Cli, working_dir: &Path) -> Result<(PipelineConfig, StepGraph)> {
    let (path, config) = load_config(cli, working_dir)?;
    println!(
        "{} Loaded pipeline: {}",
        INFO,
        style(path.display()).bold()
    );

    let graph = config
        .to_graph()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    Ok((config, graph))
}

async fn run_pipeline(cmd: &RunCommand, cli: &Cli) -> Result<u8> {
    let working_dir = working_dir(cli)?;
    let (config, graph) = load_graph(cli, &working_dir)?;

    let runner = ShellRunner::new(&working_dir);
    let manifest = PackageManifest::new(config.manifest_path(&working_dir));
    let executor = StepExecutor::new(runner, manifest).with_stderr_policy(config.stderr);
    let mut engine = ExecutionEngine::new(executor);

    let reporter = Arc::new(ConsoleReporter::new(cmd.max_output_lines));
    let handler_reporter = reporter.clone();
    engine.add_event_handler(move |event| handler_reporter.handle(&event));

    println!();
    let outcome = engine.execute(&graph).await;

    println!("\n{}", format_outcome(&outcome));
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    Ok(outcome.exit_code())
}

fn validate_pipeline(cmd: &ValidateCommand, cli: &Cli) -> Result<u8> {
    println!("{} Validating pipeline...", INFO);

    let working_dir = working_dir(cli)?;
    let (config, graph) = match load_graph(cli, &working_dir) {
        Ok(loaded) => loaded,
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            return Ok(EXIT_FATAL);
        }
    };

    println!("{} Pipeline configuration is valid!", CHECK);
    println!("  Root: {}", style(&config.root).bold());
    println!(
        "  Steps: {} configured, {} reachable",
        style(config.steps.len()).cyan(),
        style(graph.len()).cyan()
    );
    for line in format_plan(&graph) {
        println!("    {}", line);
    }

    if cmd.json {
        let json = serde_json::to_string_pretty(&config)?;
        println!("\n{}", json);
    }

    Ok(0)
}
