use std::time::Duration;

/// Puts the current thread to sleep for the specified duration.
///
/// The sleep resumes after signal interruptions until the full wall-clock
/// duration has elapsed.
pub fn sleep(dur: Duration) {
    std::thread::sleep(dur);
}
