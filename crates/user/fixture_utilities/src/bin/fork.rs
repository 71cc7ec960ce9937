use std::time::Duration;

use fixture_params::{EXIT_FAILURE, EXIT_SUCCESS, FORK_EXPECTED_ARGS};
use fixture_user_lib::{
    env,
    process::{self, JoinHandle},
    thread,
};
use fixture_utilities::{OrExit as _, exit, exit_err, num, role::ProcessRole};

fn main() {
    let args = env::args().collect::<Vec<_>>();
    let [arg] = args.as_slice() else {
        // usage goes to stdout under a fixed name, whatever argv[0] is
        println!(
            "fork: expected {FORK_EXPECTED_ARGS} parameter, given {}",
            args.len()
        );
        process::exit(EXIT_FAILURE);
    };

    let secs = num::parse_int_lossy(arg);
    let dur = Duration::from_secs(u64::try_from(secs).unwrap_or(0));

    // no threads have been spawned yet
    let handle = unsafe { process::fork() }
        .or_exit(|e| exit_err!(e, "fork child process failed"));
    let role = ProcessRole::of(&handle);

    println!("{role}: sleeping {secs} seconds");
    thread::sleep(dur);

    if let JoinHandle::Parent { mut child } = handle {
        let status = child
            .wait()
            .or_exit(|e| exit_err!(e, "wait child process failed"));
        if !status.success() {
            exit!(
                "child process {} exited with status {}",
                child.id(),
                status.code()
            );
        }
    }

    process::exit(EXIT_SUCCESS);
}
