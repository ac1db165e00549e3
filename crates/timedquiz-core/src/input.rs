//! Line-oriented interactive input.
//!
//! A single pump thread reads lines from the underlying reader into a
//! bounded channel. The receiving half sits behind an async mutex, so at
//! most one collector pulls a line at a time no matter how many hold a
//! handle to the source.

use std::io::BufRead;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

/// Lines buffered between the reader thread and the collectors.
const LINE_BUFFER: usize = 64;

/// Shared handle to the participant's input stream.
#[derive(Clone)]
pub struct InputSource {
    lines: Arc<Mutex<mpsc::Receiver<String>>>,
}

impl InputSource {
    /// Read from the process's standard input.
    pub fn stdin() -> Self {
        Self::from_reader(std::io::BufReader::new(std::io::stdin()))
    }

    /// Read lines from any blocking reader on a dedicated thread.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than ending the
    /// stream, so a garbled line reaches the collector as malformed input.
    /// The thread is detached and must never hold up runtime shutdown.
    pub fn from_reader<R>(mut reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        tracing::warn!("stopped reading input: {e}");
                        break;
                    }
                }
                if tx.blocking_send(decode_line(&buf)).is_err() {
                    break;
                }
            }
            tracing::debug!("input reader reached end of stream");
        });
        Self::from_channel(rx)
    }

    /// Wrap an existing channel of lines. Dropping every sender closes the
    /// source.
    pub fn from_channel(rx: mpsc::Receiver<String>) -> Self {
        Self {
            lines: Arc::new(Mutex::new(rx)),
        }
    }

    /// Wait for the next line. `None` once the source is closed and drained.
    ///
    /// Cancel-safe: dropping the returned future before it completes loses
    /// no line.
    pub async fn next_line(&self) -> Option<String> {
        let mut lines = self.lines.lock().await;
        lines.recv().await
    }

    /// Remove and return every line already queued, without waiting.
    ///
    /// Returns nothing if another reader currently holds the source.
    pub fn drain_pending(&self) -> Vec<String> {
        let Ok(mut lines) = self.lines.try_lock() else {
            return Vec::new();
        };
        let mut drained = Vec::new();
        while let Ok(line) = lines.try_recv() {
            drained.push(line);
        }
        drained
    }
}

/// Decode one raw line, dropping the `\n` or `\r\n` terminator.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
