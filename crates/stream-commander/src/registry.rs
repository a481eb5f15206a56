//! Command registry: command names mapped to handlers.
//!
//! Names are matched exactly (case-sensitive, no trimming). Each name has at
//! most one handler; registering a name again replaces its handler in place
//! so the listing order stays the order of first registration.

use std::sync::Arc;

use log::debug;

use crate::commander::StreamCommander;
use crate::error::{CommanderError, CommanderResult};

/// Separator used when listing command names.
pub const COMMAND_LIST_SEPARATOR: &str = ", ";

/// A handler for one registered command.
///
/// Receives the owning device and the argument string (possibly empty).
pub trait CommandHandler: Send + Sync {
    /// Run the command.
    fn handle(&self, commander: &mut StreamCommander, arguments: &str);
}

impl<F> CommandHandler for F
where
    F: Fn(&mut StreamCommander, &str) + Send + Sync,
{
    fn handle(&self, commander: &mut StreamCommander, arguments: &str) {
        self(commander, arguments)
    }
}

/// The fallback for command names nothing is registered under.
///
/// Receives the unmatched command name as well as its arguments.
pub trait DefaultHandler: Send + Sync {
    /// Handle an unregistered command.
    fn handle(&self, commander: &mut StreamCommander, command: &str, arguments: &str);
}

impl<F> DefaultHandler for F
where
    F: Fn(&mut StreamCommander, &str, &str) + Send + Sync,
{
    fn handle(&self, commander: &mut StreamCommander, command: &str, arguments: &str) {
        self(commander, command, arguments)
    }
}

/// Shared reference to a command handler.
pub type SharedCommandHandler = Arc<dyn CommandHandler>;

/// Shared reference to a default handler.
pub type SharedDefaultHandler = Arc<dyn DefaultHandler>;

/// Outcome of a successful [`CommandRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// A new name was appended.
    Added,
    /// An existing name got a new handler.
    Replaced,
}

struct CommandEntry {
    name: String,
    handler: SharedCommandHandler,
}

/// Ordered collection of command registrations.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any previous handler.
    pub fn register(
        &mut self,
        name: &str,
        handler: SharedCommandHandler,
    ) -> CommanderResult<Registration> {
        if name.is_empty() {
            return Err(CommanderError::EmptyCommandName);
        }

        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.handler = handler;
            debug!("replaced handler for command '{}'", name);
            return Ok(Registration::Replaced);
        }

        self.entries.push(CommandEntry {
            name: name.to_string(),
            handler,
        });
        debug!("registered command '{}'", name);
        Ok(Registration::Added)
    }

    /// Find the handler registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<SharedCommandHandler> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| Arc::clone(&e.handler))
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Registered names joined by `", "`, in registration order.
    pub fn list(&self) -> String {
        self.names().collect::<Vec<_>>().join(COMMAND_LIST_SEPARATOR)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
