#![no_std]

/// Number of positional arguments `fork` accepts.
pub const FORK_EXPECTED_ARGS: usize = 1;

/// Exit status of a run that completed normally.
pub const EXIT_SUCCESS: i32 = 0;

/// Exit status of usage errors and failed system calls.
pub const EXIT_FAILURE: i32 = 1;
