//! Transport layer for talking to a SerAPI process
//!
//! [`Transport`] is the line-level contract the session drives. The
//! [`SubprocessTransport`] implementation spawns `sertop` (or anything else
//! described by a [`LaunchConfig`](crate::LaunchConfig)) and talks to it over
//! its standard streams.

pub mod lines;
pub mod subprocess;

use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Line-oriented channel to a prover process
///
/// Reads and writes are never issued concurrently: the session sends one
/// command and then reads until that command completes.
pub trait Transport: Send + Sync {
    /// Start the process. Calling it on a connected transport is a no-op.
    ///
    /// # Errors
    /// Returns error if the process cannot be started
    fn connect(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Write one line (a newline is appended) and flush
    ///
    /// # Errors
    /// Returns error if the input stream is closed or the write fails
    fn write_line(&mut self, line: &str) -> impl Future<Output = Result<()>> + Send;

    /// Read the next output line without its terminator.
    ///
    /// Returns `Ok(None)` at end of stream; EOF is not an error at this level.
    ///
    /// # Errors
    /// Returns error on I/O failure or an over-long line
    fn read_line(&mut self) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Close the process's input stream
    ///
    /// # Errors
    /// Returns error if closing fails
    fn end_input(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Everything the process wrote to its error stream, read to EOF
    ///
    /// # Errors
    /// Returns error if the error stream could not be collected
    fn read_all_error(&mut self) -> impl Future<Output = Result<String>> + Send;

    /// Whether the process is still running
    fn is_alive(&mut self) -> bool;

    /// Exit code, once the process has exited with one
    fn exit_code(&mut self) -> Option<i32>;

    /// Close input, wait up to `grace` for the process to exit, then kill it.
    ///
    /// Returns the exit code when there is one.
    ///
    /// # Errors
    /// Returns error if waiting on the process fails
    fn terminate(&mut self, grace: Duration)
    -> impl Future<Output = Result<Option<i32>>> + Send;
}

pub use lines::LineChannel;
pub use subprocess::SubprocessTransport;
