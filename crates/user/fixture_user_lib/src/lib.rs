//! Process primitives for the fixture programs.
//!
//! A small hosted counterpart of a user-space runtime: argument access,
//! process duplication with a tagged result, reaping, and sleeping.

pub mod env;
pub mod error;
pub mod process;
pub mod thread;
