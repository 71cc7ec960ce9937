//! Helpers for driving a spawned program to completion in integration tests.

use std::{ffi::OsStr, path::Path};

use anyhow::Context as _;
use tokio::time::{self, Duration};

use crate::{LoggedCommand, Output, Runner};

/// Waits for a spawned command to terminate within `timeout`.
///
/// The command is killed when the timeout elapses.
///
/// # Errors
///
/// Returns an error if the command does not terminate in time or its output
/// cannot be collected.
pub async fn wait_terminate(
    command: LoggedCommand,
    timeout: Duration,
) -> Result<Output, anyhow::Error> {
    time::timeout(timeout, command.wait_terminate())
        .await
        .context("command timed out")?
}

/// Runs `program` with `args` in the runner's workspace and collects its
/// output.
///
/// # Errors
///
/// Returns an error if the program cannot be spawned, does not terminate
/// within `timeout`, or its output cannot be collected.
pub async fn run_test<I, S>(
    runner: &Runner,
    program: &Path,
    args: I,
    timeout: Duration,
) -> Result<Output, anyhow::Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let command = runner.spawn(program, args)?;
    wait_terminate(command, timeout).await
}

/// Waits until every line in `expected` has appeared on the command's stdout.
///
/// # Errors
///
/// Returns an error if the lines do not appear within `timeout`.
pub async fn wait_lines(
    command: &LoggedCommand,
    expected: &[&str],
    timeout: Duration,
) -> Result<(), anyhow::Error> {
    time::timeout(
        timeout,
        command.wait_output(0, |s| {
            expected.iter().all(|line| s.lines().any(|l| l == *line))
        }),
    )
    .await
    .context("expected output did not appear in time")?
}
