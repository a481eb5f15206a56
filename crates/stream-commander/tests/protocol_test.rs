//! Wire-level tests: bytes in on the channel, lines out.

use std::sync::Arc;

use parking_lot::Mutex;
use stream_commander::{
    CommanderConfig, FetchOutcome, MemoryChannel, MemoryStorage, Message, MessageType,
    StreamCommander,
};

/// Helper to build an initialized device and drain its startup lines.
fn device_with(config: CommanderConfig) -> (StreamCommander, MemoryChannel) {
    let channel = MemoryChannel::new();
    let mut commander = StreamCommander::new(channel.clone());
    commander.init(&config);
    channel.take_lines();
    (commander, channel)
}

fn device() -> (StreamCommander, MemoryChannel) {
    device_with(CommanderConfig::default())
}

/// Feed one chunk of input and run a single cycle.
fn send(commander: &mut StreamCommander, channel: &MemoryChannel, input: &str) -> Vec<String> {
    channel.push_input(input);
    commander.fetch_command().expect("memory channel never fails");
    channel.take_lines()
}

// ============================================================================
// Framing and dispatch
// ============================================================================

#[test]
fn test_led_on_reaches_handler() {
    let (mut commander, channel) = device();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    commander.add_command("led", move |_: &mut StreamCommander, args: &str| {
        sink.lock().push(args.to_string());
    });

    channel.push_input("led on\r\n");
    let outcome = commander.fetch_command().unwrap();

    match outcome {
        FetchOutcome::Dispatched(cmd) => {
            assert_eq!(cmd.name, "led");
            assert_eq!(cmd.arguments, "on");
        }
        other => panic!("expected dispatch, got {:?}", other),
    }
    assert_eq!(*seen.lock(), vec!["on".to_string()]);
}

#[test]
fn test_ping() {
    let (mut commander, channel) = device();
    assert_eq!(send(&mut commander, &channel, "ping\n"), vec!["ping:reply"]);
}

#[test]
fn test_empty_command_is_silent() {
    let (mut commander, channel) = device();
    channel.push_input("\r\n");
    assert_eq!(commander.fetch_command().unwrap(), FetchOutcome::Dropped);
    assert!(channel.take_lines().is_empty());
}

#[test]
fn test_unregistered_command() {
    let (mut commander, channel) = device();
    let lines = send(&mut commander, &channel, "foo bar\r\n");
    assert_eq!(lines.len(), 1);

    let msg = Message::parse(&lines[0], ':').unwrap();
    assert_eq!(msg.message_type(), Some(MessageType::Response));
    assert!(msg.content.contains("foo"));
    assert!(msg.content.contains("not registered"));
}

#[test]
fn test_command_listing_after_reregistration() {
    let (mut commander, channel) = device_with(CommanderConfig {
        add_standard_commands: false,
        ..CommanderConfig::default()
    });
    commander.add_command("a", |_: &mut StreamCommander, _: &str| {});
    commander.add_command("b", |_: &mut StreamCommander, _: &str| {});
    commander.add_command("a", |c: &mut StreamCommander, _: &str| c.send_commands());
    channel.take_lines();

    assert_eq!(commander.num_commands(), 2);
    assert_eq!(send(&mut commander, &channel, "a\r\n"), vec!["commands:a, b"]);
}

#[test]
fn test_commands_builtin_lists_user_commands_last() {
    let (mut commander, channel) = device();
    commander.add_command("led", |_: &mut StreamCommander, _: &str| {});

    let lines = send(&mut commander, &channel, "commands\r\n");
    assert_eq!(
        lines,
        vec!["commands:activate, deactivate, isactive, setecho, setid, getid, ping, getstatus, commands, led"]
    );
}

#[test]
fn test_case_sensitive_lookup() {
    let (mut commander, channel) = device();
    assert_eq!(
        send(&mut commander, &channel, "PING\r\n"),
        vec!["response:Command 'PING' not registered."]
    );
}

#[test]
fn test_pipelined_commands_only_first_runs() {
    let (mut commander, channel) = device();
    assert_eq!(
        send(&mut commander, &channel, "ping\r\nsetid lost\r\n"),
        vec!["ping:reply"]
    );
    assert_eq!(commander.id(), "");
}

// ============================================================================
// Status publication
// ============================================================================

#[test]
fn test_status_pushed_once_while_active() {
    let (mut commander, channel) = device();
    commander.add_command("led", |c: &mut StreamCommander, args: &str| {
        c.update_status(&format!("led {}", args.trim()));
    });

    assert_eq!(send(&mut commander, &channel, "led on\n"), vec!["status:led on"]);
    assert!(send(&mut commander, &channel, "led on\n").is_empty());
    assert_eq!(send(&mut commander, &channel, "led off\n"), vec!["status:led off"]);
}

#[test]
fn test_deactivate_stops_pushes_but_not_queries() {
    let (mut commander, channel) = device();
    commander.add_command("led", |c: &mut StreamCommander, args: &str| {
        c.update_status(&format!("led {}", args.trim()));
    });

    assert_eq!(send(&mut commander, &channel, "deactivate\n"), vec!["active:0"]);
    assert!(send(&mut commander, &channel, "deactivate\n").is_empty());
    assert!(send(&mut commander, &channel, "led on\n").is_empty());
    assert_eq!(send(&mut commander, &channel, "getstatus\n"), vec!["status:led on"]);
    assert_eq!(send(&mut commander, &channel, "isactive\n"), vec!["active:0"]);
    assert_eq!(send(&mut commander, &channel, "activate\n"), vec!["active:1"]);
}

// ============================================================================
// Echo
// ============================================================================

#[test]
fn test_echo_toggle() {
    let (mut commander, channel) = device();

    assert!(send(&mut commander, &channel, "setecho on\r\n").is_empty());
    assert_eq!(
        send(&mut commander, &channel, "ping extra\r\n"),
        vec!["echo:ping extra", "ping:reply"]
    );
    assert_eq!(
        send(&mut commander, &channel, "setecho off\r\n"),
        vec!["echo:setecho off"]
    );
    assert_eq!(send(&mut commander, &channel, "ping\r\n"), vec!["ping:reply"]);
}

#[test]
fn test_echo_from_config() {
    let (mut commander, channel) = device_with(CommanderConfig {
        echo: true,
        ..CommanderConfig::default()
    });
    assert_eq!(
        send(&mut commander, &channel, "getid\n"),
        vec!["echo:getid", "id:"]
    );
}

// ============================================================================
// Identity
// ============================================================================

#[test]
fn test_setid_persists_and_survives_restart() {
    let storage = MemoryStorage::new();
    let channel = MemoryChannel::new();
    let mut commander = StreamCommander::with_storage(channel.clone(), storage.clone());
    commander.init(&CommanderConfig::default());
    channel.take_lines();

    assert_eq!(
        send(&mut commander, &channel, "setid  kitchen \r\n"),
        vec!["id:kitchen"]
    );
    assert_eq!(
        send(&mut commander, &channel, "setid kitchen\r\n"),
        vec!["response:ID is already 'kitchen'."]
    );
    assert_eq!(storage.writes(), 1);

    let rebooted = MemoryChannel::new();
    let mut commander = StreamCommander::with_storage(rebooted.clone(), storage.clone());
    commander.init(&CommanderConfig::default());
    assert_eq!(commander.id(), "kitchen");
    assert_eq!(
        rebooted.take_lines(),
        vec![
            "id:kitchen",
            "active:1",
            "info:Device with ID 'kitchen' is ready."
        ]
    );
}

#[test]
fn test_setid_too_long() {
    let (mut commander, channel) = device_with(CommanderConfig {
        id_max_length: 8,
        ..CommanderConfig::default()
    });
    send(&mut commander, &channel, "setid short\r\n");

    let lines = send(&mut commander, &channel, "setid much-too-long\r\n");
    assert_eq!(
        lines,
        vec!["error:ID 'much-too-long' too long (max length = 8)."]
    );
    assert_eq!(commander.id(), "short");
}

// ============================================================================
// Custom delimiters
// ============================================================================

#[test]
fn test_custom_delimiters() {
    let (mut commander, channel) = device_with(CommanderConfig {
        command_delimiter: '=',
        message_delimiter: '|',
        ..CommanderConfig::default()
    });

    assert_eq!(send(&mut commander, &channel, "setid=dev 1\n"), vec!["id|dev 1"]);
    assert_eq!(
        send(&mut commander, &channel, "setid dev\n"),
        vec!["response|Command 'setid dev' not registered."]
    );
}
