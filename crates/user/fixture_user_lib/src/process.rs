use std::io::{self, Write as _};

use nix::{
    errno::Errno,
    sys::wait::{self, WaitStatus},
    unistd::{self, ForkResult},
};
pub use nix::unistd::Pid as ProcId;

use crate::error::OsError;

/// Represents the exit status of a process.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    status: i32,
}

impl ExitStatus {
    /// Creates a new `ExitStatus` with the given status code.
    #[must_use]
    pub fn new(status: i32) -> Self {
        Self { status }
    }

    /// Checks if the process exited successfully.
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Returns the status code of the process.
    ///
    /// A process terminated by signal `n` reports `128 + n`, as shells do.
    #[must_use]
    pub fn code(&self) -> i32 {
        self.status
    }
}

/// Represents a child process.
#[derive(Debug)]
pub struct Child {
    pid: ProcId,
}

impl Child {
    /// Returns the process ID of the child process.
    #[must_use]
    pub fn id(&self) -> ProcId {
        self.pid
    }

    /// Waits for the child process to exit and returns its exit status.
    pub fn wait(&mut self) -> Result<ExitStatus, OsError> {
        wait_pid(self.pid)
    }
}

/// Represents a handle to a forked process, indicating whether it is the parent
/// or child process.
#[derive(Debug)]
pub enum JoinHandle {
    Parent { child: Child },
    Child,
}

impl JoinHandle {
    /// Checks if the handle is for the parent process.
    #[must_use]
    pub fn is_parent(&self) -> bool {
        matches!(self, Self::Parent { .. })
    }
}

/// Forks the current process, creating a new child process.
///
/// Pending standard output is flushed first so that it is not written twice.
///
/// # Safety
///
/// The calling process must be single-threaded. In a multi-threaded process
/// the child may only call async-signal-safe functions until it execs or
/// exits.
pub unsafe fn fork() -> Result<JoinHandle, OsError> {
    // best effort; a failed flush must not prevent the fork
    let _ = io::stdout().flush();
    let handle = match unsafe { unistd::fork() }? {
        ForkResult::Parent { child } => JoinHandle::Parent {
            child: Child { pid: child },
        },
        ForkResult::Child => JoinHandle::Child,
    };
    Ok(handle)
}

/// Exits the current process with the specified status code.
pub fn exit(status: i32) -> ! {
    // nothing left to report a flush failure to
    let _ = io::stdout().flush();
    std::process::exit(status)
}

/// Waits for the specified child process to exit and returns its exit status.
///
/// # Panics
///
/// This function will panic if the waited process ID does not match the target
/// process ID.
pub fn wait_pid(pid: ProcId) -> Result<ExitStatus, OsError> {
    let (wpid, status) = wait_exit(pid)?;
    assert_eq!(
        pid, wpid,
        "The waited process ID does not match the target process ID"
    );
    Ok(status)
}

fn wait_exit(target: ProcId) -> Result<(ProcId, ExitStatus), OsError> {
    loop {
        match wait::waitpid(target, None) {
            Ok(WaitStatus::Exited(pid, code)) => return Ok((pid, ExitStatus::new(code))),
            Ok(WaitStatus::Signaled(pid, signal, _core_dumped)) => {
                return Ok((pid, ExitStatus::new(128 + signal as i32)));
            }
            Ok(_) | Err(Errno::EINTR) => {}
            Err(e) => return Err(e.into()),
        }
    }
}
