use std::{env, ffi::OsString, path::Path};

/// Returns the file name of the running program.
///
/// Falls back to the full `argv[0]` when it has no file name component, and
/// to an empty string when the process was started without any arguments.
#[must_use]
pub fn arg0() -> String {
    let Some(arg0) = env::args_os().next() else {
        return String::new();
    };
    Path::new(&arg0)
        .file_name()
        .unwrap_or(arg0.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// Returns the arguments passed to the program, without the program name.
///
/// Arguments that are not valid Unicode are converted lossily.
#[must_use]
pub fn args() -> Args {
    let mut iter = env::args_os();
    iter.next(); // Skip the program name
    Args { iter }
}

pub struct Args {
    iter: env::ArgsOs,
}

impl Iterator for Args {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(into_lossy)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl ExactSizeIterator for Args {
    fn len(&self) -> usize {
        self.iter.len()
    }
}

fn into_lossy(arg: OsString) -> String {
    arg.into_string()
        .unwrap_or_else(|arg| arg.to_string_lossy().into_owned())
}
