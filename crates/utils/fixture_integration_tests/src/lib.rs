pub use self::{
    logged_command::{LoggedCommand, Output},
    runner::Runner,
};

pub mod logged_command;
pub mod monitor;
mod runner;

#[macro_export]
macro_rules! runner {
    ($name:expr) => {
        $crate::Runner::new(env!("CARGO_PKG_NAME"), module_path!(), $name)
    };
}
