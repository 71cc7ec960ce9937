//! Test runner for integration tests.
//!
//! This module provides the `Runner` struct, which prepares a per-test
//! workspace directory and spawns the program under test inside it.

use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

use anyhow::Context as _;
use tokio::{process::Command, task};

use crate::LoggedCommand;

/// The build profile the test binaries were compiled with.
const PROFILE: &str = if cfg!(debug_assertions) {
    "debug"
} else {
    "release"
};

/// A global atomic counter for assigning unique runner IDs.
static RUNNER_ID: AtomicUsize = AtomicUsize::new(0);

/// Represents a test runner for integration tests.
pub struct Runner {
    /// The unique ID of the runner.
    id: usize,
    /// The workspace directory for the test.
    workspace_dir: PathBuf,
}

impl Runner {
    /// Creates a new `Runner` instance.
    ///
    /// The workspace directory is
    /// `target/fixture/<profile>/<package>/<module path>/<test name>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace directory cannot be created.
    pub async fn new(
        pkg_name: &str,
        module_path: &str,
        fn_name: &str,
    ) -> Result<Self, anyhow::Error> {
        let id = RUNNER_ID.fetch_add(1, Ordering::Relaxed);
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let project_root = manifest_dir
            .ancestors()
            .nth(3)
            .context("project root not found")?;

        let mut workspace_dir = project_root
            .join("target")
            .join("fixture")
            .join(PROFILE)
            .join(pkg_name);

        for component in module_path.split("::") {
            workspace_dir.push(component);
        }
        workspace_dir.push(fn_name);

        task::spawn_blocking({
            let workspace_dir = workspace_dir.clone();
            move || fs::create_dir_all(workspace_dir).context("create workspace failed")
        })
        .await??;

        Ok(Self { id, workspace_dir })
    }

    /// Returns the unique ID of the runner.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the workspace directory for the test.
    #[must_use]
    pub fn workspace_dir(&self) -> &Path {
        &self.workspace_dir
    }

    /// Spawns `program` with `args` inside the workspace directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned.
    pub fn spawn<I, S>(&self, program: &Path, args: I) -> Result<LoggedCommand, anyhow::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let command_name = program
            .file_name()
            .context("program has no file name")?
            .to_string_lossy()
            .into_owned();

        let mut command = Command::new(program);
        command.args(args).current_dir(&self.workspace_dir);

        LoggedCommand::new(command, self.id, &command_name, &self.workspace_dir)
    }
}
