use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while looking for charm directories
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to read directory: {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to check for marker file: {path}")]
    Probe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while publishing the step output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write output")]
    Write {
        #[from]
        source: std::io::Error,
    },

    #[error("Failed to append to output file: {path}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output protocol 'env-file' requires the GITHUB_OUTPUT environment variable")]
    MissingEnvFile,

    #[error("Failed to render output value")]
    Render {
        #[from]
        source: serde_json::Error,
    },
}
