//! Settings applied by [`StreamCommander::init`](crate::StreamCommander::init).

use serde::{Deserialize, Serialize};

use crate::channel::DEFAULT_READ_TIMEOUT_MS;
use crate::codec::DEFAULT_MESSAGE_DELIMITER;
use crate::frame::DEFAULT_COMMAND_DELIMITER;
use crate::identity::DEFAULT_ID_MAX_LENGTH;

/// Initialization settings for a device.
///
/// Every field can also be changed individually after `init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommanderConfig {
    /// Whether status changes are pushed automatically.
    pub active: bool,
    /// Character between a command name and its arguments.
    pub command_delimiter: char,
    /// Character between a message type and its content.
    pub message_delimiter: char,
    /// Echo every parsed command back as an `echo` message.
    pub echo: bool,
    /// Register the built-in commands during `init`.
    pub add_standard_commands: bool,
    /// Bound on a single channel read, in milliseconds. Negative values are
    /// rejected with an error message.
    pub read_timeout_ms: i64,
    /// Maximum identity length in bytes; also the persisted record size.
    pub id_max_length: usize,
}

impl Default for CommanderConfig {
    fn default() -> Self {
        CommanderConfig {
            active: true,
            command_delimiter: DEFAULT_COMMAND_DELIMITER,
            message_delimiter: DEFAULT_MESSAGE_DELIMITER,
            echo: false,
            add_standard_commands: true,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            id_max_length: DEFAULT_ID_MAX_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CommanderConfig::default();
        assert!(config.active);
        assert_eq!(config.command_delimiter, ' ');
        assert_eq!(config.message_delimiter, ':');
        assert!(!config.echo);
        assert!(config.add_standard_commands);
        assert_eq!(config.read_timeout_ms, 100);
        assert_eq!(config.id_max_length, 32);
    }
}
