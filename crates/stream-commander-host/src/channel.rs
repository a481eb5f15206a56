//! A [`Channel`] over any blocking reader/writer pair.
//!
//! Input is pumped by a reader thread into a crossbeam channel, so
//! `available()` can answer without blocking, just like a UART's receive
//! buffer. Output goes straight to the writer.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::BytesMut;
use crossbeam_channel::{Receiver, Sender};
use stream_commander::{Channel, LINE_TERMINATOR};
use tracing::{debug, trace};

/// Size of a single read by the pump thread.
const READ_CHUNK: usize = 256;

/// A duplex channel backed by a reader thread and a writer.
pub struct StreamChannel {
    input: Receiver<Vec<u8>>,
    pending: BytesMut,
    writer: Box<dyn Write + Send>,
    timeout: Duration,
    closed: Arc<AtomicBool>,
}

impl StreamChannel {
    /// Start pumping `reader` and write to `writer`.
    pub fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::unbounded();
        let closed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&closed);
        thread::spawn(move || pump(reader, tx, flag));

        StreamChannel {
            input: rx,
            pending: BytesMut::with_capacity(READ_CHUNK),
            writer: Box::new(writer),
            timeout: Duration::ZERO,
            closed,
        }
    }

    /// Channel over a connected TCP client.
    pub fn tcp(stream: TcpStream) -> io::Result<Self> {
        let reader = stream.try_clone()?;
        Ok(Self::new(reader, stream))
    }

    /// Channel over this process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin(), io::stdout())
    }

    /// Flag set once the reader hit end of input or failed.
    ///
    /// Input pumped before the flag was set is still delivered.
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }

    fn drain_input(&mut self) {
        while let Ok(chunk) = self.input.try_recv() {
            self.pending.extend_from_slice(&chunk);
        }
    }
}

fn pump<R: Read>(mut reader: R, tx: Sender<Vec<u8>>, closed: Arc<AtomicBool>) {
    let mut buf = [0u8; READ_CHUNK];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => {
                debug!("input reached end of stream");
                break;
            }
            Ok(n) => {
                trace!(bytes = n, "input received");
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!(error = %e, "input read failed");
                break;
            }
        }
    }
    closed.store(true, Ordering::SeqCst);
}

impl Channel for StreamChannel {
    fn available(&mut self) -> usize {
        self.drain_input();
        self.pending.len()
    }

    fn read_available(&mut self) -> io::Result<String> {
        self.drain_input();
        // Keep reading until the line goes quiet for `timeout`.
        while let Ok(chunk) = self.input.recv_timeout(self.timeout) {
            self.pending.extend_from_slice(&chunk);
        }
        let bytes = self.pending.split();
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(LINE_TERMINATOR.as_bytes())?;
        self.writer.flush()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Instant;

    /// A writer whose contents the test can read back.
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuffer(pub(crate) Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn wait_for_input(channel: &mut StreamChannel, len: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while channel.available() < len {
            assert!(Instant::now() < deadline, "input never arrived");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_reads_pumped_input() {
        let mut channel = StreamChannel::new(io::Cursor::new(b"ping\r\n".to_vec()), io::sink());
        wait_for_input(&mut channel, 6);

        assert_eq!(channel.read_available().unwrap(), "ping\r\n");
        assert_eq!(channel.available(), 0);
    }

    #[test]
    fn test_closed_after_end_of_input() {
        let channel = StreamChannel::new(io::empty(), io::sink());
        let closed = channel.closed_flag();
        let deadline = Instant::now() + Duration::from_secs(5);
        while !closed.load(Ordering::SeqCst) {
            assert!(Instant::now() < deadline, "reader never finished");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_write_line_appends_crlf() {
        let out = SharedBuffer::default();
        let mut channel = StreamChannel::new(io::empty(), out.clone());
        channel.write_line("ping:reply").unwrap();
        channel.write_line("status:idle").unwrap();
        assert_eq!(out.contents(), "ping:reply\r\nstatus:idle\r\n");
    }
}
