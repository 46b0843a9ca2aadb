//! Error types for the SerAPI session engine
//!
//! Prover errors (`CoqExn`) are not errors here. They are ordinary outcomes
//! of submitting bad input and travel as data inside result records.
//! Everything in [`SerapiError`] is either a configuration problem or a fault
//! that desynchronises the engine from the prover.

use thiserror::Error;

/// Main error type for the SerAPI session engine
#[derive(Error, Debug)]
pub enum SerapiError {
    /// The prover executable could not be located
    #[error("sertop executable not found: {0}")]
    ExecutableNotFound(String),

    /// The child process could not be started
    #[error("Connection error: {0}")]
    Connection(String),

    /// End of stream or unexpected process exit while a command was in flight
    #[error("Transport error: {message}")]
    Transport {
        /// Error message
        message: String,
        /// Exit code of the child, when it had already exited
        exit_code: Option<i32>,
    },

    /// The prover and the engine disagree about the conversation state
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A caller-imposed deadline expired; the child has been terminated
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The session hit a fault earlier and refuses further commands
    #[error("Session is no longer usable: {0}")]
    SessionDead(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A response line was longer than the configured limit
    #[error("Response line exceeded maximum length of {0} bytes")]
    LineTooLong(usize),

    /// Transcript (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for SerAPI operations
pub type Result<T> = std::result::Result<T, SerapiError>;

impl SerapiError {
    /// Create an executable-not-found error
    #[must_use]
    pub fn executable_not_found(name: &str) -> Self {
        Self::ExecutableNotFound(format!(
            "`{name}` is not on PATH. Install coq-serapi with:\n\
             opam install coq-serapi\n\
             \n\
             or pass an explicit executable path in the launch configuration"
        ))
    }

    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self::Transport {
            message: msg.into(),
            exit_code,
        }
    }

    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a session-dead error
    pub fn session_dead(reason: impl Into<String>) -> Self {
        Self::SessionDead(reason.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Whether this error leaves the session unusable.
    ///
    /// Protocol, transport, timeout and I/O failures all mean the engine can
    /// no longer trust its view of the prover's document.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::Protocol(_)
                | Self::Timeout(_)
                | Self::LineTooLong(_)
                | Self::Io(_)
        )
    }
}
