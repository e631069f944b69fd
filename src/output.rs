use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use crate::error::OutputError;

/// Name of the step output carrying the charm paths
pub const OUTPUT_VARIABLE_NAME: &str = "charm_paths";

/// Environment variable the runner sets to the step output file
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// Normalized charm paths, rendered as a JSON array of strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CharmPaths(pub Vec<String>);

impl CharmPaths {
    pub fn render(&self) -> Result<String, OutputError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for CharmPaths {
    fn from(paths: Vec<String>) -> Self {
        Self(paths)
    }
}

impl fmt::Display for CharmPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.render().map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

/// How the step output is handed to the runner, as configured
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OutputProtocol {
    /// Env file when the runner provides one, `::set-output` otherwise
    #[default]
    Auto,
    SetOutput,
    EnvFile,
}

/// Where the step output ends up, resolved from an [`OutputProtocol`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// `::set-output name=X::Y` directive on the output stream
    SetOutput,
    /// `X=Y` line appended to the runner's output file
    EnvFile(PathBuf),
}

impl OutputProtocol {
    pub fn resolve(self) -> Result<OutputTarget, OutputError> {
        self.resolve_with(env::var_os(GITHUB_OUTPUT_ENV).map(PathBuf::from))
    }

    /// Resolve against an explicit output file instead of the environment
    pub fn resolve_with(self, env_file: Option<PathBuf>) -> Result<OutputTarget, OutputError> {
        let env_file = env_file.filter(|p| !p.as_os_str().is_empty());
        match (self, env_file) {
            (OutputProtocol::SetOutput, _) => Ok(OutputTarget::SetOutput),
            (OutputProtocol::EnvFile, Some(path)) | (OutputProtocol::Auto, Some(path)) => {
                Ok(OutputTarget::EnvFile(path))
            }
            (OutputProtocol::EnvFile, None) => Err(OutputError::MissingEnvFile),
            (OutputProtocol::Auto, None) => Ok(OutputTarget::SetOutput),
        }
    }
}

/// Publish `data` as the step output `name`.
///
/// A `Found {name}: {data}` line always goes to `out`. The machine-readable
/// entry goes to `out` or the runner's output file depending on `target`.
pub fn emit<W: Write>(
    out: &mut W,
    target: &OutputTarget,
    name: &str,
    data: &CharmPaths,
) -> Result<(), OutputError> {
    let data = data.render()?;
    writeln!(out, "Found {}: {}", name, data)?;

    match target {
        OutputTarget::SetOutput => {
            writeln!(out, "::set-output name={}::{}", name, escape_command_data(&data))?;
        }
        OutputTarget::EnvFile(path) => {
            debug!("Appending {} to {}", name, path.display());
            let env_err = |source| OutputError::EnvFile {
                path: path.clone(),
                source,
            };
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(env_err)?;
            writeln!(file, "{}={}", name, data).map_err(env_err)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// The runner decodes `%25`, `%0D` and `%0A` in workflow command values
fn escape_command_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
