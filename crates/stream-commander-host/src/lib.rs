//! Host runner for Stream Commander devices.
//!
//! Runs a [`stream_commander::StreamCommander`] on a desktop machine so the
//! protocol can be driven from a terminal or a socket without hardware:
//!
//! - **TCP**: one client at a time, each connection is a fresh device
//!   session (like plugging the board in again).
//! - **stdio**: commands on stdin, messages on stdout; logs go to stderr.
//!
//! The device identity can be kept in a file, standing in for EEPROM.

mod channel;
mod config;
mod error;
mod server;
mod storage;

pub use channel::*;
pub use config::*;
pub use error::*;
pub use server::*;
pub use storage::*;
