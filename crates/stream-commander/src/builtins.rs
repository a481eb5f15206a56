//! Built-in commands installed by [`StreamCommander::init`].
//!
//! | command      | effect                                        |
//! |--------------|-----------------------------------------------|
//! | `activate`   | set the active flag                           |
//! | `deactivate` | clear the active flag                         |
//! | `isactive`   | send `active:1` or `active:0`                 |
//! | `setecho`    | `on` / `off` toggles echo, other values ignored |
//! | `setid`      | set the identity to the trimmed argument      |
//! | `getid`      | send `id:<id>`                                |
//! | `ping`       | send `ping:reply`                             |
//! | `getstatus`  | send `status:<status>`, even when inactive    |
//! | `commands`   | send `commands:<name, name, ...>`             |

use crate::commander::StreamCommander;

/// Payload of the `ping` reply.
pub const PING_REPLY: &str = "reply";

/// Set the active flag.
pub const COMMAND_ACTIVATE: &str = "activate";
/// Clear the active flag.
pub const COMMAND_DEACTIVATE: &str = "deactivate";
/// Report the active flag.
pub const COMMAND_ISACTIVE: &str = "isactive";
/// Toggle command echo.
pub const COMMAND_SETECHO: &str = "setecho";
/// Set the identity.
pub const COMMAND_SETID: &str = "setid";
/// Report the identity.
pub const COMMAND_GETID: &str = "getid";
/// Reply to a ping.
pub const COMMAND_PING: &str = "ping";
/// Report the status.
pub const COMMAND_GETSTATUS: &str = "getstatus";
/// List registered commands.
pub const COMMAND_LISTCOMMANDS: &str = "commands";

fn command_activate(commander: &mut StreamCommander, _arguments: &str) {
    commander.set_active(true);
}

fn command_deactivate(commander: &mut StreamCommander, _arguments: &str) {
    commander.set_active(false);
}

fn command_is_active(commander: &mut StreamCommander, _arguments: &str) {
    commander.send_is_active();
}

fn command_set_echo(commander: &mut StreamCommander, arguments: &str) {
    match arguments.trim() {
        "on" => commander.set_echo_commands(true),
        "off" => commander.set_echo_commands(false),
        _ => {}
    }
}

fn command_set_id(commander: &mut StreamCommander, arguments: &str) {
    commander.set_id(arguments.trim());
}

fn command_get_id(commander: &mut StreamCommander, _arguments: &str) {
    commander.send_id();
}

fn command_ping(commander: &mut StreamCommander, _arguments: &str) {
    commander.send_ping();
}

fn command_get_status(commander: &mut StreamCommander, _arguments: &str) {
    commander.send_status();
}

fn command_list_commands(commander: &mut StreamCommander, _arguments: &str) {
    commander.send_commands();
}

/// Register every built-in command on `commander`.
pub fn add_all_standard_commands(commander: &mut StreamCommander) {
    commander.add_command(COMMAND_ACTIVATE, command_activate);
    commander.add_command(COMMAND_DEACTIVATE, command_deactivate);
    commander.add_command(COMMAND_ISACTIVE, command_is_active);
    commander.add_command(COMMAND_SETECHO, command_set_echo);
    commander.add_command(COMMAND_SETID, command_set_id);
    commander.add_command(COMMAND_GETID, command_get_id);
    commander.add_command(COMMAND_PING, command_ping);
    commander.add_command(COMMAND_GETSTATUS, command_get_status);
    commander.add_command(COMMAND_LISTCOMMANDS, command_list_commands);
}

/// The stock default handler: `response:Command '<name>' not registered.`
pub fn command_not_registered(commander: &mut StreamCommander, command: &str, _arguments: &str) {
    let reply = format!("Command '{}' not registered.", command);
    commander.send_response(&reply);
}
