#![cfg(test)]

use std::{os::unix::fs as unix_fs, path::Path, time::Duration};

use anyhow::{Context as _, ensure};
use fixture_integration_tests::{Output, monitor, runner};
use fixture_params::{EXIT_FAILURE, EXIT_SUCCESS, FORK_EXPECTED_ARGS};
use nix::{
    sys::signal::{self, Signal},
    unistd::Pid,
};
use tokio::process::Command;

const TIMEOUT: Duration = Duration::from_secs(30);

fn fork_bin() -> &'static Path {
    Path::new(env!("CARGO_BIN_EXE_fork"))
}

fn sorted_lines(output: &Output) -> Vec<&str> {
    let mut lines = output.stdout.lines().collect::<Vec<_>>();
    lines.sort_unstable();
    lines
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn fork_no_arguments() -> Result<(), anyhow::Error> {
    let r = runner!("fork_no_arguments").await?;
    let output = monitor::run_test(&r, fork_bin(), [""; 0], TIMEOUT).await?;
    assert_eq!(output.status.code(), Some(EXIT_FAILURE));
    assert_eq!(
        output.stdout,
        format!("fork: expected {FORK_EXPECTED_ARGS} parameter, given 0\n")
    );
    assert!(output.stderr.is_empty());
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn fork_too_many_arguments() -> Result<(), anyhow::Error> {
    let r = runner!("fork_too_many_arguments").await?;
    let output = monitor::run_test(&r, fork_bin(), ["3", "4"], TIMEOUT).await?;
    assert_eq!(output.status.code(), Some(EXIT_FAILURE));
    assert_eq!(
        output.stdout,
        format!("fork: expected {FORK_EXPECTED_ARGS} parameter, given 2\n")
    );
    assert!(output.stderr.is_empty());
    assert!(output.elapsed < Duration::from_secs(3));
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn fork_usage_ignores_program_name() -> Result<(), anyhow::Error> {
    let r = runner!("fork_usage_ignores_program_name").await?;
    let renamed = r.workspace_dir().join("renamed_fork");
    let _ = std::fs::remove_file(&renamed);
    unix_fs::symlink(fork_bin(), &renamed)?;
    let output = monitor::run_test(&r, &renamed, ["a", "b"], TIMEOUT).await?;
    assert_eq!(output.status.code(), Some(EXIT_FAILURE));
    assert_eq!(
        output.stdout,
        format!("fork: expected {FORK_EXPECTED_ARGS} parameter, given 2\n")
    );
    Ok(())
}

/// Returns the process IDs of the children of `pid`.
async fn child_pids(pid: u32) -> Result<Vec<i32>, anyhow::Error> {
    let output = Command::new("pgrep")
        .args(["-P", &pid.to_string()])
        .output()
        .await
        .context("pgrep execute failed")?;
    let stdout = String::from_utf8(output.stdout)?;
    let pids: Vec<i32> = stdout
        .lines()
        .map(str::parse)
        .collect::<Result<_, _>>()
        .context("pgrep output is not a pid")?;
    Ok(pids)
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn fork_reports_killed_child() -> Result<(), anyhow::Error> {
    let r = runner!("fork_reports_killed_child").await?;
    let command = r.spawn(fork_bin(), ["5"])?;
    let pid = command.id().context("fork already reaped")?;
    monitor::wait_lines(
        &command,
        &[
            "Main Process: sleeping 5 seconds",
            "Child Process: sleeping 5 seconds",
        ],
        Duration::from_secs(3),
    )
    .await?;

    let children = child_pids(pid).await?;
    ensure!(children.len() == 1, "unexpected children: {children:?}");
    signal::kill(Pid::from_raw(children[0]), Signal::SIGKILL)?;

    let output = monitor::wait_terminate(command, TIMEOUT).await?;
    assert_eq!(output.status.code(), Some(EXIT_FAILURE));
    let expected = format!(
        "fork: child process {} exited with status 137",
        children[0]
    );
    assert!(
        output.stderr.lines().any(|l| l == expected),
        "stderr: {:?}",
        output.stderr
    );
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn fork_sleeps_in_both_processes() -> Result<(), anyhow::Error> {
    let r = runner!("fork_sleeps_in_both_processes").await?;
    let output = monitor::run_test(&r, fork_bin(), ["2"], TIMEOUT).await?;
    assert_eq!(output.status.code(), Some(EXIT_SUCCESS));
    assert_eq!(
        sorted_lines(&output),
        [
            "Child Process: sleeping 2 seconds",
            "Main Process: sleeping 2 seconds",
        ]
    );
    assert!(output.stderr.is_empty());
    assert!(output.elapsed >= Duration::from_secs(2));
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn fork_prints_before_sleeping() -> Result<(), anyhow::Error> {
    let r = runner!("fork_prints_before_sleeping").await?;
    let command = r.spawn(fork_bin(), ["3"])?;
    monitor::wait_lines(
        &command,
        &[
            "Main Process: sleeping 3 seconds",
            "Child Process: sleeping 3 seconds",
        ],
        Duration::from_secs(2),
    )
    .await?;
    assert!(command.elapsed() < Duration::from_secs(3));
    let output = monitor::wait_terminate(command, TIMEOUT).await?;
    assert!(output.status.success());
    assert!(output.elapsed >= Duration::from_secs(3));
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn fork_non_numeric_is_zero() -> Result<(), anyhow::Error> {
    let r = runner!("fork_non_numeric_is_zero").await?;
    let output = monitor::run_test(&r, fork_bin(), ["abc"], TIMEOUT).await?;
    assert!(output.status.success());
    assert_eq!(
        sorted_lines(&output),
        [
            "Child Process: sleeping 0 seconds",
            "Main Process: sleeping 0 seconds",
        ]
    );
    assert!(output.elapsed < Duration::from_secs(3));
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn fork_leading_digits() -> Result<(), anyhow::Error> {
    let r = runner!("fork_leading_digits").await?;
    let output = monitor::run_test(&r, fork_bin(), ["1s"], TIMEOUT).await?;
    assert!(output.status.success());
    assert_eq!(
        sorted_lines(&output),
        [
            "Child Process: sleeping 1 seconds",
            "Main Process: sleeping 1 seconds",
        ]
    );
    assert!(output.elapsed >= Duration::from_secs(1));
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn fork_negative_does_not_sleep() -> Result<(), anyhow::Error> {
    let r = runner!("fork_negative_does_not_sleep").await?;
    let output = monitor::run_test(&r, fork_bin(), ["-4"], TIMEOUT).await?;
    assert!(output.status.success());
    assert_eq!(
        sorted_lines(&output),
        [
            "Child Process: sleeping -4 seconds",
            "Main Process: sleeping -4 seconds",
        ]
    );
    assert!(output.elapsed < Duration::from_secs(3));
    Ok(())
}
