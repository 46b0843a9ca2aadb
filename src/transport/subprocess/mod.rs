//! Subprocess transport implementation
//!
//! Spawns the process described by a [`LaunchConfig`](crate::LaunchConfig)
//! and talks to it via stdin/stdout. stderr is drained in the background
//! and handed back by `read_all_error`.

mod command;
mod lifecycle;
mod reader;
mod transport;

pub use transport::SubprocessTransport;
