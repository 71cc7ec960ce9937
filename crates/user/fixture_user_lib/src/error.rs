use nix::errno::Errno;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OsError {
    // EPERM
    #[error("operation not permitted")]
    NotPermitted,
    // ESRCH
    #[error("no such process")]
    ProcessNotFound,
    // EINTR
    #[error("interrupted system call")]
    Interrupted,
    // ECHILD
    #[error("no child process")]
    NoChildProcess,
    // EAGAIN
    #[error("resource temporarily unavailable")]
    ResourceTemporarilyUnavailable,
    // ENOMEM
    #[error("cannot allocate memory")]
    OutOfMemory,
    // EINVAL
    #[error("invalid argument")]
    InvalidInput,
    #[error("unknown error (errno {0})")]
    Unknown(i32),
}

impl From<Errno> for OsError {
    fn from(errno: Errno) -> Self {
        match errno {
            Errno::EPERM => Self::NotPermitted,
            Errno::ESRCH => Self::ProcessNotFound,
            Errno::EINTR => Self::Interrupted,
            Errno::ECHILD => Self::NoChildProcess,
            Errno::EAGAIN => Self::ResourceTemporarilyUnavailable,
            Errno::ENOMEM => Self::OutOfMemory,
            Errno::EINVAL => Self::InvalidInput,
            errno => Self::Unknown(errno as i32),
        }
    }
}
