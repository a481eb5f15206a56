//! Framing of a single inbound command.
//!
//! Inbound lines look like:
//!
//! ```text
//! <name>[<command_delimiter><arguments>]<CR|LF|CRLF>
//! ```
//!
//! Only the first terminated command in a buffer is framed. Anything after
//! the first terminator is ignored.

/// Carriage return terminator.
pub const COMMAND_EOL_CR: char = '\r';

/// Line feed terminator.
pub const COMMAND_EOL_NL: char = '\n';

/// Default character separating a command name from its arguments.
pub const DEFAULT_COMMAND_DELIMITER: char = ' ';

/// One command extracted from the input buffer.
///
/// Lives for a single dispatch cycle only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlightCommand {
    /// The command line without its terminator.
    pub raw_line: String,
    /// Command name, everything before the first delimiter.
    pub name: String,
    /// Arguments, everything after the first delimiter. May be empty.
    pub arguments: String,
}

impl InFlightCommand {
    /// The text reported when echoing is enabled: `name` alone, or
    /// `name` and `arguments` joined by a single space.
    pub fn echo_text(&self) -> String {
        if self.arguments.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.arguments)
        }
    }
}

/// Find the end of the first command in `buffer`.
///
/// Returns the byte offset of the earliest CR or LF. Returns `None` when
/// there is no terminator, or when the buffer starts with one (an empty
/// command).
pub fn find_terminator(buffer: &str) -> Option<usize> {
    let cr = buffer.find(COMMAND_EOL_CR);
    let nl = buffer.find(COMMAND_EOL_NL);

    let end = match (cr, nl) {
        (Some(cr), Some(nl)) => cr.min(nl),
        (Some(cr), None) => cr,
        (None, Some(nl)) => nl,
        (None, None) => return None,
    };

    if end == 0 {
        None
    } else {
        Some(end)
    }
}

/// Frame the first command in `buffer`.
///
/// Returns `None` for unterminated or empty input; such input is dropped
/// silently by the engine.
pub fn frame_command(buffer: &str, command_delimiter: char) -> Option<InFlightCommand> {
    let end = find_terminator(buffer)?;
    let line = &buffer[..end];

    let (name, arguments) = match line.split_once(command_delimiter) {
        Some((name, arguments)) => (name, arguments),
        None => (line, ""),
    };

    Some(InFlightCommand {
        raw_line: line.to_string(),
        name: name.to_string(),
        arguments: arguments.to_string(),
    })
}
