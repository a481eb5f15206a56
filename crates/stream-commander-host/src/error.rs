//! Error types for the host runner.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop the host runner.
#[derive(Debug, Error)]
pub enum HostError {
    /// Socket or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for [`HostConfig`](crate::HostConfig).
    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// The Ctrl-C handler could not be installed.
    #[error("failed to install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Result type alias for host operations.
pub type HostResult<T> = Result<T, HostError>;
