//! Type definitions for the SerAPI session engine
//!
//! - [`identifiers`] - Type-safe id wrappers (`CommandTag`, `SentenceId`, `SessionId`)
//! - [`options`] - Launch configuration and session options
//! - [`outcomes`] - Result records returned by session commands

pub mod identifiers;
pub mod options;
pub mod outcomes;

// Re-export commonly used types
pub use identifiers::{CommandTag, SentenceId, SessionId};
pub use options::{
    LaunchConfig, LaunchConfigBuilder, LoadPath, SessionOptions, SessionOptionsBuilder,
};
pub use outcomes::{AddOutcome, CoqExn, ExecOutcome, SentenceState, StatementResult};
