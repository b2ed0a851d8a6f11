//! package.json script lookup

use crate::runner::{ManifestError, ScriptManifest};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Script manifest backed by a `package.json` file
///
/// The file is read on every lookup, so edits made by earlier steps are
/// seen by later ones.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct PackageJson {
    #[serde(default)]
    scripts: HashMap<String, String>,
}

impl PackageManifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ScriptManifest for PackageManifest {
    async fn lookup_script(&self, name: &str) -> Result<String, ManifestError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ManifestError::Read {
                path: self.path.clone(),
                source,
            })?;

        let package: PackageJson =
            serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
                path: self.path.clone(),
                source,
            })?;

        match package.scripts.get(name) {
            Some(command) if !command.is_empty() => {
                debug!("Script \"{}\" resolved to `{}`", name, command);
                Ok(command.clone())
            }
            _ => Err(ManifestError::MissingScript {
                name: name.to_string(),
                path: self.path.clone(),
            }),
        }
    }
}
