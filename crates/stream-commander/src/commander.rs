//! The device facade and dispatch engine.
//!
//! [`StreamCommander`] owns the channel, the identity store, the status
//! register and the command registry. The host calls
//! [`StreamCommander::fetch_command`] from its main loop; each call runs at
//! most one read-frame-dispatch cycle and never waits for input to arrive.
//!
//! ```rust,ignore
//! use stream_commander::{CommanderConfig, MemoryChannel, StreamCommander};
//!
//! let channel = MemoryChannel::new();
//! let mut commander = StreamCommander::new(channel.clone());
//! commander.init(&CommanderConfig::default());
//! commander.add_command("led", |c: &mut StreamCommander, args: &str| {
//!     c.update_status(&format!("led {}", args.trim()));
//! });
//!
//! loop {
//!     commander.fetch_command()?;
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace, warn};

use crate::builtins;
use crate::channel::{Channel, DEFAULT_READ_TIMEOUT_MS};
use crate::codec::{encode_bool, encode_message, MessageType, DEFAULT_MESSAGE_DELIMITER};
use crate::config::CommanderConfig;
use crate::error::{CommanderError, CommanderResult};
use crate::frame::{frame_command, InFlightCommand, DEFAULT_COMMAND_DELIMITER};
use crate::identity::{IdentityChange, IdentityStore, DEFAULT_ID_MAX_LENGTH};
use crate::registry::{
    CommandHandler, CommandRegistry, DefaultHandler, Registration, SharedCommandHandler,
    SharedDefaultHandler,
};
use crate::status::StatusRegister;
use crate::storage::{IdentityStorage, NoStorage};

/// What a single [`StreamCommander::fetch_command`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// No input was waiting.
    Idle,
    /// Input was read but held no complete, non-empty command.
    Dropped,
    /// A registered handler ran.
    Dispatched(InFlightCommand),
    /// No handler matched; the default handler ran.
    Unhandled(InFlightCommand),
}

/// Convert a timeout in milliseconds, rejecting negative values.
fn timeout_from_millis(ms: i64) -> CommanderResult<Duration> {
    u64::try_from(ms)
        .map(Duration::from_millis)
        .map_err(|_| CommanderError::NegativeTimeout(ms))
}

/// A command/response device on a byte channel.
pub struct StreamCommander {
    channel: Box<dyn Channel>,
    identity: IdentityStore,
    status: StatusRegister,
    registry: CommandRegistry,
    default_handler: SharedDefaultHandler,
    command_delimiter: char,
    message_delimiter: char,
    echo_commands: bool,
    standard_commands_installed: bool,
    read_timeout_ms: i64,
}

impl StreamCommander {
    /// Create a device without identity persistence.
    pub fn new<C: Channel + 'static>(channel: C) -> Self {
        Self::with_storage(channel, NoStorage)
    }

    /// Create a device whose identity is persisted in `storage`.
    ///
    /// The device starts inactive, with no commands registered. Call
    /// [`StreamCommander::init`] before polling.
    pub fn with_storage<C, S>(channel: C, storage: S) -> Self
    where
        C: Channel + 'static,
        S: IdentityStorage + 'static,
    {
        let mut channel: Box<dyn Channel> = Box::new(channel);
        if let Ok(timeout) = timeout_from_millis(DEFAULT_READ_TIMEOUT_MS) {
            channel.set_timeout(timeout);
        }

        StreamCommander {
            channel,
            identity: IdentityStore::new(Box::new(storage), DEFAULT_ID_MAX_LENGTH),
            status: StatusRegister::new(),
            registry: CommandRegistry::new(),
            default_handler: Arc::new(builtins::command_not_registered),
            command_delimiter: DEFAULT_COMMAND_DELIMITER,
            message_delimiter: DEFAULT_MESSAGE_DELIMITER,
            echo_commands: false,
            standard_commands_installed: false,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }

    /// Apply `config` and announce the device.
    ///
    /// Seeds the identity from storage, applies delimiters, timeout, active
    /// and echo flags, flushes the channel, registers the built-in commands
    /// (only the first time), resets the default handler and finally sends
    /// `info:Device with ID '<id>' is ready.`
    pub fn init(&mut self, config: &CommanderConfig) {
        self.identity.set_max_length(config.id_max_length);
        self.load_id();

        self.set_command_delimiter(config.command_delimiter);
        self.set_message_delimiter(config.message_delimiter);
        self.set_read_timeout(config.read_timeout_ms);
        self.set_active(config.active);
        self.set_echo_commands(config.echo);

        if let Err(e) = self.channel.flush() {
            warn!("failed to flush channel: {}", e);
        }

        if config.add_standard_commands && !self.standard_commands_installed {
            builtins::add_all_standard_commands(self);
            self.standard_commands_installed = true;
        }

        self.set_default_handler(builtins::command_not_registered);

        let ready = format!("Device with ID '{}' is ready.", self.id());
        self.send_info(&ready);
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Run one read-frame-dispatch cycle.
    ///
    /// Returns immediately with [`FetchOutcome::Idle`] if no input is
    /// waiting. Otherwise reads what is available, frames the first command
    /// and runs its handler. Input after the first terminator is discarded.
    /// The only error is a failing channel read.
    pub fn fetch_command(&mut self) -> CommanderResult<FetchOutcome> {
        if self.channel.available() == 0 {
            return Ok(FetchOutcome::Idle);
        }

        let buffer = self
            .channel
            .read_available()
            .map_err(CommanderError::Channel)?;

        let Some(command) = frame_command(&buffer, self.command_delimiter) else {
            trace!("dropping input without a command: {:?}", buffer);
            return Ok(FetchOutcome::Dropped);
        };

        if self.echo_commands {
            let echo = command.echo_text();
            self.send_echo(&echo);
        }

        if self.execute_command(&command.name, &command.arguments) {
            Ok(FetchOutcome::Dispatched(command))
        } else {
            Ok(FetchOutcome::Unhandled(command))
        }
    }

    /// Run the handler registered under `name`, or the default handler.
    ///
    /// Returns `true` if a registered handler ran.
    pub fn execute_command(&mut self, name: &str, arguments: &str) -> bool {
        match self.registry.lookup(name) {
            Some(handler) => {
                debug!("dispatching '{}' with arguments {:?}", name, arguments);
                handler.handle(self, arguments);
                true
            }
            None => {
                debug!("no handler for '{}', using default handler", name);
                let fallback = Arc::clone(&self.default_handler);
                fallback.handle(self, name, arguments);
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Registry
    // ------------------------------------------------------------------

    /// Register a closure or function under `name`.
    ///
    /// Re-registering a name replaces its handler and sends an `info`
    /// notice. An empty name is rejected with an `error` message.
    pub fn add_command<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&mut StreamCommander, &str) + Send + Sync + 'static,
    {
        self.add_command_handler(name, Arc::new(handler));
    }

    /// Register a shared [`CommandHandler`] under `name`.
    pub fn add_command_handler(&mut self, name: &str, handler: SharedCommandHandler) {
        match self.registry.register(name, handler) {
            Ok(Registration::Added) => {}
            Ok(Registration::Replaced) => {
                let notice =
                    format!("Command '{}' already found. Replacing with new command.", name);
                self.send_info(&notice);
            }
            Err(e) => self.report_error(&e),
        }
    }

    /// Whether a handler is registered under `name`.
    pub fn has_command(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Number of registered commands.
    pub fn num_commands(&self) -> usize {
        self.registry.len()
    }

    /// Registered command names, comma-separated, in registration order.
    pub fn command_list(&self) -> String {
        self.registry.list()
    }

    /// Replace the handler for unregistered commands.
    pub fn set_default_handler<F>(&mut self, handler: F)
    where
        F: Fn(&mut StreamCommander, &str, &str) + Send + Sync + 'static,
    {
        self.default_handler = Arc::new(handler);
    }

    /// Replace the handler for unregistered commands with a shared one.
    pub fn set_default_handler_shared(&mut self, handler: Arc<dyn DefaultHandler>) {
        self.default_handler = handler;
    }

    /// The handler for unregistered commands.
    pub fn default_handler(&self) -> SharedDefaultHandler {
        Arc::clone(&self.default_handler)
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    /// Set the active flag, sending `active:<0|1>` if it changed.
    pub fn set_active(&mut self, active: bool) {
        if self.status.set_active(active) {
            self.send_is_active();
        }
    }

    /// Whether status changes are pushed automatically.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Store a new status; push it as `status:<status>` if it changed and
    /// the device is active.
    pub fn update_status(&mut self, status: &str) {
        if self.status.update(status) {
            self.send_status();
        }
    }

    /// Store a status without sending anything.
    pub fn set_status(&mut self, status: &str) {
        self.status.set_status(status);
    }

    /// Current status.
    pub fn status(&self) -> &str {
        self.status.status()
    }

    /// Set the device identity.
    ///
    /// Sends `id:<id>` on change, a `response` if it is already set to `id`,
    /// or an `error` if it is too long or cannot be persisted.
    pub fn set_id(&mut self, id: &str) {
        match self.identity.set(id) {
            Ok(IdentityChange::Changed) => self.send_id(),
            Ok(IdentityChange::Unchanged) => {
                let reply = format!("ID is already '{}'.", id);
                self.send_response(&reply);
            }
            Err(e) => self.report_error(&e),
        }
    }

    /// Current identity.
    pub fn id(&self) -> &str {
        self.identity.get()
    }

    /// Maximum identity length in bytes.
    pub fn id_max_length(&self) -> usize {
        self.identity.max_length()
    }

    fn load_id(&mut self) {
        match self.identity.load() {
            Ok(Some(id)) => self.set_id(&id),
            Ok(None) => {}
            Err(e) => self.report_error(&e),
        }
    }

    /// Set the character between a command name and its arguments.
    pub fn set_command_delimiter(&mut self, delimiter: char) {
        self.command_delimiter = delimiter;
    }

    /// Character between a command name and its arguments.
    pub fn command_delimiter(&self) -> char {
        self.command_delimiter
    }

    /// Set the character between a message type and its content.
    pub fn set_message_delimiter(&mut self, delimiter: char) {
        self.message_delimiter = delimiter;
    }

    /// Character between a message type and its content.
    pub fn message_delimiter(&self) -> char {
        self.message_delimiter
    }

    /// Enable or disable echoing of parsed commands.
    pub fn set_echo_commands(&mut self, echo: bool) {
        self.echo_commands = echo;
    }

    /// Whether parsed commands are echoed.
    pub fn echo_commands(&self) -> bool {
        self.echo_commands
    }

    /// Set the channel read timeout. Negative values are rejected with an
    /// `error` message and leave the timeout unchanged.
    pub fn set_read_timeout(&mut self, timeout_ms: i64) {
        match timeout_from_millis(timeout_ms) {
            Ok(timeout) => {
                self.channel.set_timeout(timeout);
                self.read_timeout_ms = timeout_ms;
            }
            Err(e) => self.report_error(&e),
        }
    }

    /// Channel read timeout in milliseconds.
    pub fn read_timeout_ms(&self) -> i64 {
        self.read_timeout_ms
    }

    // ------------------------------------------------------------------
    // Outbound messages
    // ------------------------------------------------------------------

    /// Send `kind<delimiter>content` as one line.
    ///
    /// Write failures are logged; the line is lost.
    pub fn send_message(&mut self, kind: &str, content: &str) {
        let line = encode_message(kind, self.message_delimiter, content);
        if let Err(e) = self.channel.write_line(&line) {
            warn!("failed to write {:?}: {}", line, e);
        }
    }

    fn send(&mut self, kind: MessageType, content: &str) {
        self.send_message(kind.as_str(), content);
    }

    /// Send a `response` message.
    pub fn send_response(&mut self, response: &str) {
        self.send(MessageType::Response, response);
    }

    /// Send an `info` message.
    pub fn send_info(&mut self, info: &str) {
        self.send(MessageType::Info, info);
    }

    /// Send an `error` message.
    pub fn send_error(&mut self, error: &str) {
        self.send(MessageType::Error, error);
    }

    /// Send `ping:reply`.
    pub fn send_ping(&mut self) {
        self.send(MessageType::Ping, builtins::PING_REPLY);
    }

    /// Send the current status, regardless of the active flag.
    pub fn send_status(&mut self) {
        let status = self.status.status().to_string();
        self.send(MessageType::Status, &status);
    }

    /// Send the current identity.
    pub fn send_id(&mut self) {
        let id = self.identity.get().to_string();
        self.send(MessageType::Id, &id);
    }

    /// Send the active flag as `1` or `0`.
    pub fn send_is_active(&mut self) {
        let active = encode_bool(self.status.is_active());
        self.send(MessageType::Active, active);
    }

    /// Send an `echo` message.
    pub fn send_echo(&mut self, echo: &str) {
        self.send(MessageType::Echo, echo);
    }

    /// Send the registered command names.
    pub fn send_commands(&mut self) {
        let list = self.registry.list();
        self.send(MessageType::Commands, &list);
    }

    fn report_error(&mut self, error: &CommanderError) {
        debug!("rejected: {}", error);
        self.send_error(&error.to_string());
    }
}

impl std::fmt::Debug for StreamCommander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamCommander")
            .field("identity", &self.identity)
            .field("status", &self.status)
            .field("registry", &self.registry)
            .field("command_delimiter", &self.command_delimiter)
            .field("message_delimiter", &self.message_delimiter)
            .field("echo_commands", &self.echo_commands)
            .field("read_timeout_ms", &self.read_timeout_ms)
            .finish()
    }
}
