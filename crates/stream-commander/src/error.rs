//! Error types for the command engine.

use thiserror::Error;

/// Errors that can occur inside the command engine.
///
/// None of these are fatal: the device facade reports them as `error`
/// messages on the channel and carries on.
#[derive(Debug, Error)]
pub enum CommanderError {
    /// A command was registered with an empty name.
    #[error("Command name must not be empty.")]
    EmptyCommandName,

    /// An identity longer than the configured maximum was rejected.
    #[error("ID '{id}' too long (max length = {max}).")]
    IdTooLong {
        /// The rejected identity.
        id: String,
        /// Maximum identity length in bytes.
        max: usize,
    },

    /// A negative read timeout was rejected.
    #[error("Timeout has to be >= 0.")]
    NegativeTimeout(i64),

    /// The channel failed while reading or writing.
    #[error("channel I/O error: {0}")]
    Channel(#[source] std::io::Error),

    /// The identity storage failed while reading or writing its record.
    #[error("storage I/O error: {0}")]
    Storage(#[source] std::io::Error),
}

/// Result type alias for command engine operations.
pub type CommanderResult<T> = Result<T, CommanderError>;
