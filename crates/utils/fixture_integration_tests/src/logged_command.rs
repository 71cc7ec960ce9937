//! Utilities for managing and logging subprocess commands.
//!
//! This module provides the `LoggedCommand` struct, which wraps a subprocess,
//! mirrors its output streams to the test output and a log file, and keeps
//! the captured text for assertions.

use std::{
    fs::File,
    io::{self, Write as _},
    path::Path,
    process::{self, ExitStatus, Stdio},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use anyhow::{Context as _, ensure};
use tokio::{
    io::{AsyncRead, AsyncReadExt as _},
    process::{Child, Command},
    sync::watch,
    task::JoinHandle,
};

/// Everything a terminated subprocess produced.
#[derive(Debug, Clone)]
pub struct Output {
    /// The exit status of the subprocess.
    pub status: ExitStatus,
    /// Text written to stdout, including by processes that inherited it.
    pub stdout: String,
    /// Text written to stderr, including by processes that inherited it.
    pub stderr: String,
    /// Wall-clock time from spawn until both streams were closed and the
    /// subprocess was reaped.
    pub elapsed: Duration,
}

/// Which stream of the current process captured output is mirrored to.
#[derive(Debug, Clone, Copy)]
enum Mirror {
    Stdout,
    Stderr,
}

/// A struct for managing and logging subprocess commands.
pub struct LoggedCommand {
    /// The child process being managed.
    proc: Child,
    /// The instant the child process was spawned.
    started: Instant,
    /// Handle for managing the stdout task.
    stdout_handle: JoinHandle<Result<(), anyhow::Error>>,
    /// Handle for managing the stderr task.
    stderr_handle: JoinHandle<Result<(), anyhow::Error>>,
    /// Buffer for storing the child process's stdout content.
    stdout_content: Arc<Mutex<String>>,
    /// Buffer for storing the child process's stderr content.
    stderr_content: Arc<Mutex<String>>,
    /// Watcher for tracking changes in the stdout content length.
    stdout_rx: watch::Receiver<usize>,
}

impl LoggedCommand {
    /// Creates a new `LoggedCommand` instance.
    ///
    /// This spawns a subprocess using the provided `Command` with a null
    /// stdin, and starts tasks that copy its stdout and stderr to the log
    /// file `fixture.<pid>.<runner id>.<command name>.out`.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be created or the subprocess
    /// cannot be spawned.
    pub fn new(
        mut command: Command,
        runner_id: usize,
        command_name: &str,
        workspace_dir: &Path,
    ) -> Result<Self, anyhow::Error> {
        let log_path = workspace_dir.join(format!(
            "fixture.{}.{}.{}.out",
            process::id(),
            runner_id,
            command_name
        ));
        let log = Arc::new(Mutex::new(
            File::create(&log_path).context("open logfile failed")?,
        ));

        let started = Instant::now();
        let mut proc = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .context("spawn command failed")?;

        let stdout = proc.stdout.take().context("stdout is not piped")?;
        let stderr = proc.stderr.take().context("stderr is not piped")?;

        let (stdout_tx, stdout_rx) = watch::channel(0);
        let stdout_content = Arc::new(Mutex::new(String::new()));
        let stdout_handle = tokio::spawn(handle_output(
            Arc::clone(&log),
            stdout,
            Mirror::Stdout,
            Arc::clone(&stdout_content),
            stdout_tx,
        ));

        let (stderr_tx, _stderr_rx) = watch::channel(0);
        let stderr_content = Arc::new(Mutex::new(String::new()));
        let stderr_handle = tokio::spawn(handle_output(
            log,
            stderr,
            Mirror::Stderr,
            Arc::clone(&stderr_content),
            stderr_tx,
        ));

        Ok(Self {
            proc,
            started,
            stdout_handle,
            stderr_handle,
            stdout_content,
            stderr_content,
            stdout_rx,
        })
    }

    /// Returns the process ID of the subprocess, if it has not been reaped.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.proc.id()
    }

    /// Returns a reference to the stdout content buffer.
    #[must_use]
    pub fn stdout(&self) -> &Arc<Mutex<String>> {
        &self.stdout_content
    }

    /// Returns a clone of the stdout watcher.
    ///
    /// This allows monitoring changes to the length of the stdout content.
    #[must_use]
    pub fn stdout_watch(&self) -> watch::Receiver<usize> {
        self.stdout_rx.clone()
    }

    /// Returns the time elapsed since the subprocess was spawned.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Waits for the stdout content to satisfy a given condition.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout is closed before the condition holds.
    pub async fn wait_output<F>(&self, start: usize, mut cond: F) -> Result<(), anyhow::Error>
    where
        F: FnMut(&str) -> bool,
    {
        let mut stdout_watch = self.stdout_watch();
        loop {
            let _len = *stdout_watch.borrow_and_update();
            if cond(&self.stdout().lock().unwrap()[start..]) {
                break;
            }
            stdout_watch
                .changed()
                .await
                .context("stdout closed before the expected output")?;
        }
        Ok(())
    }

    /// Waits for the subprocess to terminate and collects its output.
    ///
    /// Both output streams are drained to end-of-file first, so processes
    /// that inherited them are also waited for.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the output tasks fail or if the process
    /// cannot be awaited.
    pub async fn wait_terminate(mut self) -> Result<Output, anyhow::Error> {
        self.stdout_handle
            .await
            .context("stdout handle join failed")??;
        self.stderr_handle
            .await
            .context("stderr handle join failed")??;
        let status = self.proc.wait().await.context("wait command failed")?;
        let elapsed = self.started.elapsed();
        let stdout = self.stdout_content.lock().unwrap().clone();
        let stderr = self.stderr_content.lock().unwrap().clone();
        Ok(Output {
            status,
            stdout,
            stderr,
            elapsed,
        })
    }
}

async fn handle_output<R>(
    log: Arc<Mutex<File>>,
    mut stream: R,
    mirror: Mirror,
    output: Arc<Mutex<String>>,
    output_tx: watch::Sender<usize>,
) -> Result<(), anyhow::Error>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0; 4096];
    let mut pending = Vec::new();

    loop {
        let n = stream.read(&mut buf).await.context("read output failed")?;
        let closed = n == 0;
        pending.extend_from_slice(&buf[..n]);

        // a multi-byte sequence may be split across reads
        let valid = match std::str::from_utf8(&pending) {
            Ok(s) => s.len(),
            Err(e) => {
                ensure!(!closed && e.error_len().is_none(), "invalid utf-8");
                e.valid_up_to()
            }
        };
        let s = std::str::from_utf8(&pending[..valid])?;

        match mirror {
            Mirror::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(s.as_bytes())?;
                out.flush()?;
            }
            Mirror::Stderr => {
                let mut out = io::stderr().lock();
                out.write_all(s.as_bytes())?;
                out.flush()?;
            }
        }

        {
            let mut log = log.lock().unwrap();
            log.write_all(s.as_bytes())?;
            log.flush()?;
        }

        {
            let mut output = output.lock().unwrap();
            output.push_str(s);
            let _ = output_tx.send(output.len());
        }

        pending.drain(..valid);

        if closed {
            break;
        }
    }
    Ok(())
}
