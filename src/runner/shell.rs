//! Shell command runner - spawns commands through the platform shell

use crate::runner::{CommandOutput, CommandRunner, RunnerError};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// Runs commands with `sh -c` (`cmd /C` on Windows)
#[derive(Debug, Clone)]
pub struct ShellRunner {
    /// Directory commands run in
    working_dir: PathBuf,
}

impl ShellRunner {
    /// Create a runner for commands in `working_dir`
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    fn shell_command(command: &str) -> Command {
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command);
            cmd
        }
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    /// Run a command and wait for it to exit
    ///
    /// There is no timeout: a command that never exits stalls the caller.
    async fn run(&self, command: &str) -> Result<CommandOutput, RunnerError> {
        debug!("Spawning `{}` in {}", command, self.working_dir.display());

        let output = Self::shell_command(command)
            .current_dir(&self.working_dir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| RunnerError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };

        debug!(
            "`{}` exited with {:?} ({} bytes stdout, {} bytes stderr)",
            command,
            result.exit_code,
            result.stdout.len(),
            result.stderr.len()
        );

        Ok(result)
    }
}
