//! Outbound message encoding.
//!
//! Every line the device sends has the same shape:
//!
//! ```text
//! <type><message_delimiter><content><CR><LF>
//! ```
//!
//! The codec does not escape anything. If `type` or `content` carry the
//! delimiter or a line terminator, the line is written as-is and the reader
//! on the other end has to cope with it.

/// Default character separating a message type from its content.
pub const DEFAULT_MESSAGE_DELIMITER: char = ':';

/// Line terminator appended by channels when writing a line.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Message types emitted by the engine and its built-in commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Reply to a command (`response`).
    Response,
    /// Informational notice (`info`).
    Info,
    /// Rejected operation (`error`).
    Error,
    /// Ping reply (`ping`).
    Ping,
    /// Current status (`status`).
    Status,
    /// Current identity (`id`).
    Id,
    /// Current active flag (`active`).
    Active,
    /// Echo of a parsed command (`echo`).
    Echo,
    /// Listing of registered commands (`commands`).
    Commands,
}

impl MessageType {
    /// Get the type string used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Response => "response",
            MessageType::Info => "info",
            MessageType::Error => "error",
            MessageType::Ping => "ping",
            MessageType::Status => "status",
            MessageType::Id => "id",
            MessageType::Active => "active",
            MessageType::Echo => "echo",
            MessageType::Commands => "commands",
        }
    }

    /// Parse a message type from its wire string.
    pub fn from_str(s: &str) -> Option<MessageType> {
        match s {
            "response" => Some(MessageType::Response),
            "info" => Some(MessageType::Info),
            "error" => Some(MessageType::Error),
            "ping" => Some(MessageType::Ping),
            "status" => Some(MessageType::Status),
            "id" => Some(MessageType::Id),
            "active" => Some(MessageType::Active),
            "echo" => Some(MessageType::Echo),
            "commands" => Some(MessageType::Commands),
            _ => None,
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encode a message body: `kind + delimiter + content`, without terminator.
pub fn encode_message(kind: &str, delimiter: char, content: &str) -> String {
    let mut line = String::with_capacity(kind.len() + delimiter.len_utf8() + content.len());
    line.push_str(kind);
    line.push(delimiter);
    line.push_str(content);
    line
}

/// Encode a complete outbound line, terminator included.
pub fn encode_line(kind: &str, delimiter: char, content: &str) -> String {
    let mut line = encode_message(kind, delimiter, content);
    line.push_str(LINE_TERMINATOR);
    line
}

/// Encode a boolean the way the device reports flags (`1` / `0`).
pub fn encode_bool(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// A message split back into its type and content.
///
/// This is the host-side view of an outbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The type string (`response`, `status`, or anything a handler chose).
    pub kind: String,
    /// Everything after the first delimiter.
    pub content: String,
}

impl Message {
    /// Create a message from a known type.
    pub fn new(kind: MessageType, content: impl Into<String>) -> Self {
        Message {
            kind: kind.as_str().to_string(),
            content: content.into(),
        }
    }

    /// Parse one line received from a device.
    ///
    /// Trailing CR/LF are stripped. The line is split at the first delimiter,
    /// so the content may itself contain the delimiter. Returns `None` if the
    /// line has no delimiter at all.
    pub fn parse(line: &str, delimiter: char) -> Option<Message> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        let (kind, content) = line.split_once(delimiter)?;
        Some(Message {
            kind: kind.to_string(),
            content: content.to_string(),
        })
    }

    /// The message type, if it is one of the built-in types.
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_str(&self.kind)
    }

    /// Encode this message with the given delimiter, without terminator.
    pub fn encode(&self, delimiter: char) -> String {
        encode_message(&self.kind, delimiter, &self.content)
    }
}
