//! Launch an executable and stream its output as it is produced.

use std::io;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};

use crate::config::ActionsConfig;
use crate::error::{Error, Result};
use crate::process::event::{OutputSource, StreamEvent};

/// Streamer settings.
#[derive(Debug, Clone)]
pub struct StreamerConfig {
    /// Events buffered between the pipe readers and the consumer.
    pub channel_capacity: usize,
    /// Kill the child when the consumer stops reading instead of letting it
    /// finish in the background.
    pub kill_on_disconnect: bool,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            kill_on_disconnect: false,
        }
    }
}

impl From<&ActionsConfig> for StreamerConfig {
    fn from(actions: &ActionsConfig) -> Self {
        Self {
            channel_capacity: actions.stream_channel_capacity,
            kill_on_disconnect: actions.kill_on_disconnect,
        }
    }
}

/// Starts processes and hands back their event streams.
#[derive(Debug, Clone, Default)]
pub struct ProcessStreamer {
    config: StreamerConfig,
}

impl ProcessStreamer {
    pub fn new(config: StreamerConfig) -> Self {
        Self { config }
    }

    /// Start `argv[0]` with the remaining elements as arguments.
    ///
    /// Working directory and environment are inherited. Fails with
    /// `Error::Launch` before any event exists if the process cannot start.
    pub fn run(&self, argv: &[String]) -> Result<ProcessRun> {
        let (program, args) = argv.split_first().ok_or_else(|| Error::Launch {
            program: "<none>".to_string(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty argument vector"),
        })?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Launch {
                program: program.clone(),
                source,
            })?;
        let pid = child.id();

        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(forward_lines(stdout, OutputSource::Stdout, tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(forward_lines(stderr, OutputSource::Stderr, tx.clone())));
        }

        tracing::info!(program = %program, pid = ?pid, "Process started");
        tokio::spawn(supervise(
            child,
            readers,
            tx,
            self.config.kill_on_disconnect,
            program.clone(),
        ));

        Ok(ProcessRun {
            pid,
            argv: argv.to_vec(),
            events: rx,
        })
    }
}

/// A running process, consumed as a stream of `StreamEvent`s.
///
/// Dropping it tells the background tasks nobody is listening any more.
#[derive(Debug)]
pub struct ProcessRun {
    pid: Option<u32>,
    argv: Vec<String>,
    events: mpsc::Receiver<StreamEvent>,
}

impl ProcessRun {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Wait for the next event; `None` after `Done` has been delivered.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.events.recv().await
    }
}

impl Stream for ProcessRun {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_recv(cx)
    }
}

/// Forward each line of `pipe` until EOF.
///
/// Once the consumer is gone the pipe is still drained so the child never
/// blocks on a full pipe.
async fn forward_lines<R>(pipe: R, source: OutputSource, tx: mpsc::Sender<StreamEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(pipe);
    let mut splitter = LineSplitter::default();
    let mut lines = Vec::new();
    let mut forwarding = true;

    loop {
        let len = match reader.fill_buf().await {
            Ok([]) => break,
            Ok(chunk) => {
                splitter.feed(chunk, &mut lines);
                chunk.len()
            }
            Err(e) => {
                tracing::warn!(source = source.as_str(), error = %e, "Failed to read process output");
                break;
            }
        };
        reader.consume(len);

        for text in lines.drain(..) {
            if forwarding && tx.send(StreamEvent::line(source, text)).await.is_err() {
                forwarding = false;
            }
        }
    }

    if let Some(text) = splitter.finish() {
        if forwarding {
            let _ = tx.send(StreamEvent::line(source, text)).await;
        }
    }
}

/// Splits raw output into lines ended by `\n`, `\r\n` or a lone `\r`.
///
/// A `\r` at the end of one read and a `\n` at the start of the next are a
/// single terminator.
#[derive(Debug, Default)]
struct LineSplitter {
    pending: Vec<u8>,
    after_cr: bool,
}

impl LineSplitter {
    fn feed(&mut self, chunk: &[u8], out: &mut Vec<String>) {
        for &byte in chunk {
            if self.after_cr {
                self.after_cr = false;
                if byte == b'\n' {
                    continue;
                }
            }
            match byte {
                b'\n' | b'\r' => {
                    out.push(String::from_utf8_lossy(&self.pending).into_owned());
                    self.pending.clear();
                    self.after_cr = byte == b'\r';
                }
                _ => self.pending.push(byte),
            }
        }
    }

    /// The unterminated tail, if any.
    fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.pending).into_owned())
        }
    }
}

/// Wait for the readers, reap the child and emit the final `Done`.
async fn supervise(
    mut child: Child,
    readers: Vec<JoinHandle<()>>,
    tx: mpsc::Sender<StreamEvent>,
    kill_on_disconnect: bool,
    program: String,
) {
    let pid = child.id();
    let aborts: Vec<AbortHandle> = readers.iter().map(JoinHandle::abort_handle).collect();
    let drained = futures_util::future::join_all(readers);
    tokio::pin!(drained);

    let disconnected = tokio::select! {
        _ = &mut drained => false,
        _ = tx.closed() => true,
    };

    if disconnected && kill_on_disconnect {
        tracing::info!(program = %program, pid = ?pid, "Consumer disconnected, killing process");
        if let Err(e) = child.start_kill() {
            tracing::warn!(program = %program, pid = ?pid, error = %e, "Failed to kill process");
        }
        // Grandchildren may keep the pipes open; the readers are not needed.
        let status = child.wait().await;
        for abort in aborts {
            abort.abort();
        }
        log_exit(&program, pid, status);
        return;
    }

    if disconnected {
        tracing::info!(
            program = %program,
            pid = ?pid,
            "Consumer disconnected, letting process finish"
        );
        drained.await;
    }

    let exit_code = log_exit(&program, pid, child.wait().await);
    let _ = tx.send(StreamEvent::Done { exit_code }).await;
}

fn log_exit(program: &str, pid: Option<u32>, status: io::Result<ExitStatus>) -> i32 {
    match status {
        Ok(status) => {
            let code = exit_code(status);
            tracing::info!(program = %program, pid = ?pid, exit_code = code, "Process finished");
            code
        }
        Err(e) => {
            tracing::error!(program = %program, pid = ?pid, error = %e, "Failed to wait for process");
            -1
        }
    }
}

/// Exit code, or the negated signal number for a signal-terminated child.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}
