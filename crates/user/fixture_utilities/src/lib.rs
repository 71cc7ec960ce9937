use core::convert::Infallible;

pub mod num;
pub mod role;

#[macro_export]
macro_rules! message {
    ($($msg:tt)*) => {
        {
            let prog = ::fixture_user_lib::env::arg0();
            ::std::eprintln!("{prog}: {msg}", msg = ::core::format_args!($($msg)*));
        }
    }
}

#[macro_export]
macro_rules! message_err {
    ($err:expr, $($msg:tt)*) => {
        $crate::message!("{msg}: {err}", msg = ::core::format_args!($($msg)*), err = $err)
    }
}

#[macro_export]
macro_rules! exit {
    ($($msg:tt)*) => {
        {
            $crate::message!($($msg)*);
            ::fixture_user_lib::process::exit(::fixture_params::EXIT_FAILURE);
        }
    }
}

#[macro_export]
macro_rules! exit_err {
    ($err:expr, $($msg:tt)*) => {
        {
            $crate::message_err!($err, $($msg)*);
            ::fixture_user_lib::process::exit(::fixture_params::EXIT_FAILURE);
        }
    }
}

/// Unwraps a result, or hands the error to a handler that never returns.
pub trait OrExit<T, E> {
    fn or_exit<F>(self, f: F) -> T
    where
        F: FnOnce(E) -> Infallible;
}

impl<T, E> OrExit<T, E> for Result<T, E> {
    #[track_caller]
    fn or_exit<F>(self, f: F) -> T
    where
        F: FnOnce(E) -> Infallible,
    {
        match self {
            Ok(val) => val,
            Err(e) => {
                let _: Infallible = f(e);
                unreachable!()
            }
        }
    }
}
