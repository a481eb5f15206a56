//! Host configuration, loaded from YAML.
//!
//! ```yaml
//! poll_interval_ms: 10
//! commander:
//!   active: true
//!   command_delimiter: " "
//!   message_delimiter: ":"
//!   echo: false
//!   read_timeout_ms: 100
//!   id_max_length: 32
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stream_commander::CommanderConfig;

use crate::error::{HostError, HostResult};

/// Default pause between idle polls, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Configuration for the host runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Device settings applied at `init`.
    pub commander: CommanderConfig,
    /// Pause between polls when no input is waiting.
    pub poll_interval_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig {
            commander: CommanderConfig::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl HostConfig {
    /// Parse a configuration from YAML text. Missing keys take defaults.
    pub fn from_yaml_str(yaml: &str) -> HostResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a configuration file.
    pub fn from_yaml_file(path: &Path) -> HostResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|source| HostError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Pause between idle polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
