//! Command execution collaborators
//!
//! Step handlers reach the outside world through two seams: a
//! [`CommandRunner`] that runs a shell command and a [`ScriptManifest`]
//! that maps script names to commands.

pub mod manifest;
pub mod response;
pub mod shell;

use async_trait::async_trait;
pub use manifest::PackageManifest;
pub use response::{CommandOutput, ManifestError, RunnerError};
pub use shell::ShellRunner;

/// Trait for command execution - allows for different implementations
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion and capture its output
    async fn run(&self, command: &str) -> Result<CommandOutput, RunnerError>;
}

/// Trait for script lookup in a project manifest
#[async_trait]
pub trait ScriptManifest: Send + Sync {
    /// Resolve a script name to the command it runs
    async fn lookup_script(&self, name: &str) -> Result<String, ManifestError>;
}

#[async_trait]
impl<T: CommandRunner + ?Sized> CommandRunner for std::sync::Arc<T> {
    async fn run(&self, command: &str) -> Result<CommandOutput, RunnerError> {
        (**self).run(command).await
    }
}

#[async_trait]
impl<T: ScriptManifest + ?Sized> ScriptManifest for std::sync::Arc<T> {
    async fn lookup_script(&self, name: &str) -> Result<String, ManifestError> {
        (**self).lookup_script(name).await
    }
}
