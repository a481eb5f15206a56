//! Stream Commander
//!
//! A line-based command/response engine for devices that talk to a host over
//! a byte stream (UART, software serial, a socket). The host sends text
//! commands, the device maps each command name to a registered handler and
//! answers with typed messages. The device can also push status changes on
//! its own.
//!
//! # Protocol Overview
//!
//! - **Commands** (host → device): `<name>[ <arguments>]` terminated by CR, LF
//!   or CRLF. The delimiter between name and arguments is configurable.
//! - **Messages** (device → host): `<type>:<content>` terminated by CRLF. The
//!   delimiter between type and content is configurable.
//!
//! Message types used by the engine: `response`, `info`, `error`, `ping`,
//! `status`, `id`, `active`, `echo`, `commands`.
//!
//! # Polling
//!
//! The host calls [`StreamCommander::fetch_command`] from its main loop. Each
//! call handles at most one command and returns at once if no input is
//! waiting.
//!
//! # Example
//!
//! ```rust,ignore
//! use stream_commander::{CommanderConfig, MemoryChannel, StreamCommander};
//!
//! let channel = MemoryChannel::new();
//! let mut commander = StreamCommander::new(channel.clone());
//! commander.init(&CommanderConfig::default());
//!
//! channel.push_input("ping\r\n");
//! commander.fetch_command()?;
//! assert_eq!(channel.take_lines(), vec!["ping:reply"]);
//! ```

pub mod builtins;
mod channel;
mod codec;
mod commander;
mod config;
mod error;
mod frame;
mod identity;
mod registry;
mod status;
mod storage;

pub use channel::*;
pub use codec::*;
pub use commander::*;
pub use config::*;
pub use error::*;
pub use frame::*;
pub use identity::*;
pub use registry::*;
pub use status::*;
pub use storage::*;
