use fixture_user_lib::process::JoinHandle;

/// Which side of a fork the current process is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ProcessRole {
    #[strum(to_string = "Main Process")]
    Main,
    #[strum(to_string = "Child Process")]
    Child,
}

impl ProcessRole {
    #[must_use]
    pub fn of(handle: &JoinHandle) -> Self {
        if handle.is_parent() {
            Self::Main
        } else {
            Self::Child
        }
    }
}
