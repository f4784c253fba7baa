// src/exec/supervisor.rs

//! Interpreter process supervision.
//!
//! One call runs one child: the generated source is streamed to its stdin
//! while stdout and stderr are drained into a single line stream, all at
//! the same time. Writing and draining run as separate Tokio tasks so that
//! neither side can stall the other on a full pipe buffer.

use std::collections::VecDeque;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::errors::{BridgeError, Result};
use crate::exec::cancel::CancelToken;
use crate::types::OutputForward;

/// How long drains may keep reading after the child exited. Bounds the wait
/// when a grandchild inherited the pipes and keeps them open.
const DRAIN_GRACE: Duration = Duration::from_secs(5);

/// A child that ran to completion with exit status 0.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub exit_code: i32,
    /// Last captured output lines, oldest first.
    pub output_tail: Vec<String>,
    pub elapsed: Duration,
}

/// Background tasks attached to one child.
struct Pumps {
    writer: JoinHandle<io::Result<()>>,
    drains: Vec<JoinHandle<()>>,
    collector: JoinHandle<Vec<String>>,
}

impl Pumps {
    fn abort(&self) {
        self.writer.abort();
        for drain in &self.drains {
            drain.abort();
        }
        self.collector.abort();
    }
}

/// Launch the interpreter, feed it `source` and wait for it to exit.
///
/// - Non-zero exit: [`BridgeError::ForeignProcessFailed`] with the output tail.
/// - Cancellation or the configured timeout kills the child before returning.
/// - The child is always waited for (or killed) before an error propagates.
pub async fn run_interpreter(
    settings: &Settings,
    source: String,
    cancel: &mut CancelToken,
) -> Result<ProcessOutcome> {
    let program = &settings.interpreter.program;
    let started = Instant::now();

    let mut child = spawn_child(settings)?;
    info!(
        program = %program,
        pid = ?child.id(),
        source_bytes = source.len(),
        "started interpreter"
    );

    let (fail_tx, fail_rx) = mpsc::unbounded_channel::<(&'static str, io::Error)>();
    let pumps = start_pumps(&mut child, source, settings, fail_tx)?;

    let status = match wait_for_exit(&mut child, fail_rx, cancel, settings.timeout()).await {
        Ok(status) => status,
        Err(e) => {
            pumps.abort();
            return Err(e);
        }
    };

    let (write_res, output_tail) = finish_pumps(pumps).await;
    let elapsed = started.elapsed();
    let exit_code = exit_code(status);

    info!(
        program = %program,
        exit_code,
        success = status.success(),
        elapsed_ms = elapsed.as_millis() as u64,
        "interpreter exited"
    );

    if !status.success() {
        return Err(BridgeError::ForeignProcessFailed {
            exit_code,
            output: output_tail,
        });
    }

    // A clean exit after a failed write means the child never saw all of
    // the source.
    if let Err(e) = write_res {
        return Err(BridgeError::ProcessIo {
            stream: "stdin",
            source: e,
        });
    }

    Ok(ProcessOutcome {
        exit_code,
        output_tail,
        elapsed,
    })
}

/// Wait for the child to exit. Every early return kills and reaps the child
/// first.
async fn wait_for_exit(
    child: &mut Child,
    mut fail_rx: mpsc::UnboundedReceiver<(&'static str, io::Error)>,
    cancel: &mut CancelToken,
    timeout: Option<Duration>,
) -> Result<ExitStatus> {
    let deadline = async {
        match timeout {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    tokio::select! {
        res = child.wait() => match res {
            Ok(status) => Ok(status),
            Err(e) => {
                terminate(child).await;
                Err(BridgeError::ProcessIo { stream: "wait", source: e })
            }
        },
        Some((stream, e)) = fail_rx.recv() => {
            error!(stream, error = %e, "draining interpreter output failed; killing process");
            terminate(child).await;
            Err(BridgeError::ProcessIo { stream, source: e })
        }
        _ = cancel.cancelled() => {
            info!(pid = ?child.id(), "cancellation requested; killing interpreter");
            terminate(child).await;
            Err(BridgeError::Cancelled)
        }
        _ = &mut deadline => {
            let timeout_ms = timeout.map(|d| d.as_millis() as u64).unwrap_or_default();
            warn!(pid = ?child.id(), timeout_ms, "interpreter timed out; killing process");
            terminate(child).await;
            Err(BridgeError::TimedOut { timeout_ms })
        }
    }
}

fn spawn_child(settings: &Settings) -> Result<Child> {
    let interpreter = &settings.interpreter;

    let mut cmd = Command::new(&interpreter.program);
    cmd.args(&interpreter.args)
        .envs(&interpreter.env)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(dir) = &interpreter.working_dir {
        cmd.current_dir(dir);
    }

    cmd.spawn().map_err(|e| BridgeError::ProcessLaunch {
        program: interpreter.program.clone(),
        source: e,
    })
}

fn start_pumps(
    child: &mut Child,
    source: String,
    settings: &Settings,
    fail_tx: mpsc::UnboundedSender<(&'static str, io::Error)>,
) -> Result<Pumps> {
    let missing = |stream: &'static str| BridgeError::ProcessIo {
        stream,
        source: io::Error::other("pipe not captured"),
    };
    let stdin = child.stdin.take().ok_or_else(|| missing("stdin"))?;
    let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;
    let stderr = child.stderr.take().ok_or_else(|| missing("stderr"))?;

    let (line_tx, line_rx) = mpsc::channel::<String>(256);

    let collector = tokio::spawn(collect_output(
        line_rx,
        settings.supervisor.forward_output,
        settings.supervisor.output_tail_lines,
    ));
    let drains = vec![
        tokio::spawn(drain_stream(stdout, "stdout", line_tx.clone(), fail_tx.clone())),
        tokio::spawn(drain_stream(stderr, "stderr", line_tx, fail_tx)),
    ];
    let writer = tokio::spawn(write_source(stdin, source));

    Ok(Pumps {
        writer,
        drains,
        collector,
    })
}

/// Wait for the pumps after the child exited and collect their results.
async fn finish_pumps(pumps: Pumps) -> (io::Result<()>, Vec<String>) {
    let Pumps {
        mut writer,
        drains,
        collector,
    } = pumps;

    for mut drain in drains {
        if tokio::time::timeout(DRAIN_GRACE, &mut drain).await.is_err() {
            warn!("interpreter output still open after exit; abandoning drain");
            drain.abort();
        }
    }

    let output_tail = collector.await.unwrap_or_default();
    let write_res = match tokio::time::timeout(DRAIN_GRACE, &mut writer).await {
        Ok(joined) => joined.unwrap_or_else(|e| Err(io::Error::other(e.to_string()))),
        Err(_) => {
            writer.abort();
            Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "interpreter stdin still blocked after exit",
            ))
        }
    };

    (write_res, output_tail)
}

/// Stream `source` into the child's stdin and close it.
///
/// The pipe is dropped on every path, so the child sees end-of-input even
/// when the write fails.
async fn write_source(mut stdin: ChildStdin, source: String) -> io::Result<()> {
    let res = async {
        stdin.write_all(source.as_bytes()).await?;
        stdin.flush().await?;
        stdin.shutdown().await
    }
    .await;
    drop(stdin);

    match &res {
        Ok(()) => debug!(bytes = source.len(), "wrote source to interpreter stdin"),
        Err(e) => debug!(error = %e, "writing source to interpreter stdin failed"),
    }
    res
}

/// Read `reader` line by line until EOF, forwarding lines to the collector.
///
/// Keeps reading even after the collector is gone so the child never blocks
/// on this pipe.
async fn drain_stream<R>(
    reader: R,
    stream: &'static str,
    line_tx: mpsc::Sender<String>,
    fail_tx: mpsc::UnboundedSender<(&'static str, io::Error)>,
) where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(trim_line_end(&buf)).into_owned();
                let _ = line_tx.send(line).await;
            }
            Err(e) => {
                let _ = fail_tx.send((stream, e));
                break;
            }
        }
    }

    debug!(stream, "interpreter stream closed");
}

fn trim_line_end(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

/// Forward merged output lines to the host and keep the last `tail_lines`.
async fn collect_output(
    mut line_rx: mpsc::Receiver<String>,
    forward: OutputForward,
    tail_lines: usize,
) -> Vec<String> {
    let mut tail: VecDeque<String> = VecDeque::with_capacity(tail_lines);
    let mut host_stderr = tokio::io::stderr();

    while let Some(line) = line_rx.recv().await {
        match forward {
            OutputForward::Log => info!(target: "taskbridge::child", "{}", line),
            OutputForward::Stderr => {
                let _ = host_stderr.write_all(line.as_bytes()).await;
                let _ = host_stderr.write_all(b"\n").await;
            }
            OutputForward::Discard => {}
        }

        if tail.len() == tail_lines {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    let _ = host_stderr.flush().await;
    tail.into()
}

/// Kill the child and reap it.
async fn terminate(child: &mut Child) {
    if let Err(e) = child.kill().await {
        warn!(error = %e, "failed to kill interpreter process");
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}
