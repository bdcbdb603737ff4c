//! Reader tasks that turn child output streams into lines.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::lines::LineBuffer;

/// Which stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub source: OutputSource,
    pub line: String,
}

/// Read `stream` chunk by chunk and send each complete line to `tx`.
///
/// The task ends at EOF, on a read error, or once the receiver is dropped.
/// A trailing fragment without a newline is flushed at EOF.
pub fn spawn_line_reader<R>(
    stream: R,
    source: OutputSource,
    tx: mpsc::UnboundedSender<OutputLine>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut stream = stream;
        let mut buffer = LineBuffer::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = match stream.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    debug!(?source, error = %e, "output reader exiting on read error");
                    break;
                }
            };
            for line in buffer.push(&chunk[..n]) {
                if tx.send(OutputLine { source, line }).is_err() {
                    return;
                }
            }
        }

        if let Some(line) = buffer.finish() {
            let _ = tx.send(OutputLine { source, line });
        }
    })
}

/// Bounded tail of a child's stderr, kept for failure diagnostics.
///
/// Stderr is never parsed as protocol data.
#[derive(Debug, Clone)]
pub struct StderrTail {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl StderrTail {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    /// Drain `stream` in the background into this tail.
    pub fn capture<R>(&self, stream: R) -> JoinHandle<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let reader = spawn_line_reader(stream, OutputSource::Stderr, tx);
        let tail = self.clone();
        tokio::spawn(async move {
            while let Some(OutputLine { line, .. }) = rx.recv().await {
                debug!(stderr = %line, "provider stderr");
                tail.push(line);
            }
            let _ = reader.await;
        })
    }

    pub fn push(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            if lines.len() == self.capacity {
                lines.pop_front();
            }
            lines.push_back(line);
        }
    }

    /// Captured lines joined with newlines.
    pub fn snapshot(&self) -> String {
        self.lines
            .lock()
            .map(|lines| lines.iter().cloned().collect::<Vec<_>>().join("\n"))
            .unwrap_or_default()
    }
}

impl Default for StderrTail {
    fn default() -> Self {
        Self::new(50)
    }
}
