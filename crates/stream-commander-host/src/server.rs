//! Running a device over TCP or stdio.
//!
//! One device session is one [`StreamCommander`] polled in a loop until the
//! client goes away or shutdown is requested. The TCP server serves one
//! client at a time; further clients wait in the listen backlog.

use std::io;
use std::net::{TcpListener, ToSocketAddrs};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use stream_commander::{FetchOutcome, StreamCommander};
use tracing::{debug, info, warn};

use crate::channel::StreamChannel;
use crate::config::HostConfig;
use crate::error::HostResult;
use crate::storage::FileStorage;

/// Counters for one finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Commands that reached a registered handler.
    pub dispatched: u64,
    /// Commands that fell through to the default handler.
    pub unhandled: u64,
    /// Reads that held no complete command.
    pub dropped: u64,
}

/// Commands this host adds on top of the built-in set.
///
/// `led on` / `led off` switch a simulated LED and publish the result as the
/// device status.
pub fn register_demo_commands(commander: &mut StreamCommander) {
    commander.add_command("led", |c: &mut StreamCommander, args: &str| {
        match args.trim() {
            "on" => c.update_status("led on"),
            "off" => c.update_status("led off"),
            other => c.send_error(&format!("Unknown LED state '{}'.", other)),
        }
    });
}

/// Runs device sessions with a fixed configuration.
#[derive(Debug, Clone)]
pub struct DeviceHost {
    config: HostConfig,
    id_file: Option<PathBuf>,
}

impl DeviceHost {
    /// Create a host. With `id_file`, the identity survives restarts.
    pub fn new(config: HostConfig, id_file: Option<PathBuf>) -> Self {
        DeviceHost { config, id_file }
    }

    /// Build and initialize a device on `channel`.
    pub fn build_commander(&self, channel: StreamChannel) -> StreamCommander {
        let mut commander = match &self.id_file {
            Some(path) => StreamCommander::with_storage(channel, FileStorage::new(path)),
            None => StreamCommander::new(channel),
        };
        commander.init(&self.config.commander);
        register_demo_commands(&mut commander);
        commander
    }

    /// Serve a single session on `channel` until its input closes or
    /// `shutdown` is set.
    pub fn run_session(&self, channel: StreamChannel, shutdown: &AtomicBool) -> SessionStats {
        let closed = channel.closed_flag();
        let mut commander = self.build_commander(channel);
        let mut stats = SessionStats::default();
        let poll_interval = self.config.poll_interval();

        while !shutdown.load(Ordering::SeqCst) {
            // Sample before polling so input pumped ahead of the close is
            // still seen by this fetch.
            let closing = closed.load(Ordering::SeqCst);

            match commander.fetch_command() {
                Ok(FetchOutcome::Idle) => {
                    if closing {
                        break;
                    }
                    thread::sleep(poll_interval);
                }
                Ok(FetchOutcome::Dropped) => stats.dropped += 1,
                Ok(FetchOutcome::Dispatched(cmd)) => {
                    debug!(command = %cmd.name, arguments = %cmd.arguments, "dispatched");
                    stats.dispatched += 1;
                }
                Ok(FetchOutcome::Unhandled(cmd)) => {
                    debug!(command = %cmd.name, "unregistered command");
                    stats.unhandled += 1;
                }
                Err(e) => {
                    warn!(error = %e, "channel read failed, ending session");
                    break;
                }
            }
        }

        stats
    }

    /// Accept TCP clients on `addr` one after another until `shutdown` is set.
    pub fn serve_tcp<A: ToSocketAddrs>(&self, addr: A, shutdown: &AtomicBool) -> HostResult<()> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        info!(addr = %listener.local_addr()?, "listening for a client");

        while !shutdown.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, peer)) => {
                    stream.set_nonblocking(false)?;
                    info!(%peer, "client connected");
                    let channel = StreamChannel::tcp(stream)?;
                    let stats = self.run_session(channel, shutdown);
                    info!(
                        %peer,
                        dispatched = stats.dispatched,
                        unhandled = stats.unhandled,
                        dropped = stats.dropped,
                        "client disconnected"
                    );
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(self.config.poll_interval());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// Serve one session on stdin/stdout.
    pub fn serve_stdio(&self, shutdown: &AtomicBool) -> SessionStats {
        info!("serving on stdin/stdout");
        self.run_session(StreamChannel::stdio(), shutdown)
    }
}
