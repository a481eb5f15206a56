//! `stream-commander`: run a Stream Commander device over TCP or stdio.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use stream_commander_host::{DeviceHost, HostConfig, HostResult};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Run a line-based command device on a host computer.
#[derive(Parser)]
#[command(name = "stream-commander")]
#[command(about = "Serve the Stream Commander protocol over TCP or stdio")]
#[command(version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to accept TCP clients on
    #[arg(short, long, default_value = "127.0.0.1:4000")]
    listen: String,

    /// Serve on stdin/stdout instead of TCP
    #[arg(long, conflicts_with = "listen")]
    stdio: bool,

    /// File the device identity is persisted in
    #[arg(long)]
    id_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error), overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn run(cli: Cli) -> HostResult<()> {
    let config = match &cli.config {
        Some(path) => HostConfig::from_yaml_file(path)?,
        None => HostConfig::default(),
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

    let host = DeviceHost::new(config, cli.id_file);
    if cli.stdio {
        let stats = host.serve_stdio(&shutdown);
        info!(
            dispatched = stats.dispatched,
            unhandled = stats.unhandled,
            dropped = stats.dropped,
            "stdio session ended"
        );
        Ok(())
    } else {
        host.serve_tcp(cli.listen.as_str(), &shutdown)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout may carry the protocol, so logs always go to stderr.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
