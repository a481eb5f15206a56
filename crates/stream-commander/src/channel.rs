//! The duplex byte channel the engine talks over.
//!
//! The engine only needs four things from a channel: how many bytes are
//! waiting, a bounded read of whatever is waiting, a flush, and a way to
//! write one line. UARTs, sockets and test doubles all fit behind
//! [`Channel`].

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::codec::LINE_TERMINATOR;

/// Default bound on a single read, in milliseconds.
pub const DEFAULT_READ_TIMEOUT_MS: i64 = 100;

/// A duplex text channel.
pub trait Channel: Send {
    /// Number of input bytes that can be read right now. Must not block.
    fn available(&mut self) -> usize;

    /// Read the currently available input as text.
    ///
    /// May wait for further bytes, but never longer than the configured
    /// timeout after the last byte arrived.
    fn read_available(&mut self) -> io::Result<String>;

    /// Set the bound used by [`Channel::read_available`].
    fn set_timeout(&mut self, timeout: Duration);

    /// Push out any buffered output.
    fn flush(&mut self) -> io::Result<()>;

    /// Write `line` followed by [`LINE_TERMINATOR`].
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

#[derive(Debug, Default)]
struct MemoryChannelInner {
    input: VecDeque<u8>,
    output: String,
    timeout: Duration,
    flushes: usize,
}

/// An in-memory channel.
///
/// Clones share the same buffers, so a test can keep one handle while the
/// engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    inner: Arc<Mutex<MemoryChannelInner>>,
}

impl MemoryChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes as if the host had sent them.
    pub fn push_input(&self, data: &str) {
        self.inner.lock().input.extend(data.as_bytes());
    }

    /// Everything written so far, terminators included.
    pub fn output(&self) -> String {
        self.inner.lock().output.clone()
    }

    /// Drain written output and return it as lines without terminators.
    pub fn take_lines(&self) -> Vec<String> {
        let output = std::mem::take(&mut self.inner.lock().output);
        output
            .split(LINE_TERMINATOR)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Number of input bytes not yet read.
    pub fn pending_input(&self) -> usize {
        self.inner.lock().input.len()
    }

    /// The timeout last set by the engine.
    pub fn timeout(&self) -> Duration {
        self.inner.lock().timeout
    }

    /// Number of times [`Channel::flush`] was called.
    pub fn flushes(&self) -> usize {
        self.inner.lock().flushes
    }
}

impl Channel for MemoryChannel {
    fn available(&mut self) -> usize {
        self.inner.lock().input.len()
    }

    fn read_available(&mut self) -> io::Result<String> {
        let bytes: Vec<u8> = self.inner.lock().input.drain(..).collect();
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.inner.lock().timeout = timeout;
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().flushes += 1;
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut inner = self.inner.lock();
        inner.output.push_str(line);
        inner.output.push_str(LINE_TERMINATOR);
        Ok(())
    }
}
