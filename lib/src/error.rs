//! Error type shared by every tool in the crate

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while exporting an environment or rendering an image
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a file failed
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input path exists but is not a regular file, or does not exist
    #[error("'{}' is not a file", path.display())]
    NotAFile { path: PathBuf },

    /// Piped input was requested
    #[error("reading an image from stdin is not supported")]
    StdinUnsupported,

    /// File content did not match any known image signature
    #[error("'{}' is not a recognized image format", path.display())]
    UnrecognizedImage { path: PathBuf },

    /// Signature matched but decoding failed
    #[error("failed to decode image '{}': {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid geometry '{0}': expected WIDTHxHEIGHT")]
    InvalidGeometry(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// None of the candidate binaries could be found on PATH
    #[error("no executable found for {tool} (tried: {candidates})")]
    ExecutableNotFound {
        tool: &'static str,
        candidates: String,
    },

    #[error("failed to run '{}': {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' timed out after {}s", program.display(), timeout.as_secs())]
    Timeout { program: PathBuf, timeout: Duration },

    #[error("'{}' exited with {status}: {}", program.display(), stderr.trim())]
    CommandFailed {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    /// A backend ran successfully but printed nothing usable
    #[error("{backend} backend produced no output")]
    EmptyOutput { backend: &'static str },

    #[error("no environment name or prefix given and no conda environment is active")]
    NoActiveEnvironment,

    #[error("failed to parse environment export: {0}")]
    ExportParse(#[source] serde_json::Error),

    #[error("failed to serialize environment as JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("failed to serialize environment as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
