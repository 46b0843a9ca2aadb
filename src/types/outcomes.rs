//! Result records returned by session commands
//!
//! Prover errors are plain data here. A statement that Coq rejects still
//! produces a [`StatementResult`]; only faults surface as `Err`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::identifiers::{CommandTag, SentenceId};

/// An error reported by the prover for one command.
///
/// `message` is the raw S-expression payload, starting at `(CoqExn`.
/// Structured decoding is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoqExn {
    /// Raw error payload
    pub message: String,
}

impl CoqExn {
    /// Wrap a raw payload
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CoqExn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Lifecycle position of one sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentenceState {
    /// Parsed by the prover, not yet executed
    Added,
    /// Executed without error
    Executed,
    /// Removed from the document (terminal)
    Canceled,
}

impl SentenceState {
    /// Whether no further transition is possible
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Canceled)
    }
}

/// Outcome of `Add` once its `Completed` marker was read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    /// Tag of the `Add` command
    pub tag: CommandTag,
    /// Sentence ids in the order the prover assigned them
    pub sids: Vec<SentenceId>,
    /// Prover errors reported while parsing
    pub coq_exns: Vec<CoqExn>,
}

/// Outcome of `Exec` once its `Completed` marker was read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Tag of the `Exec` command
    pub tag: CommandTag,
    /// Prover errors reported while executing
    pub coq_exns: Vec<CoqExn>,
}

/// Per-statement result of `execute_statement`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementResult {
    /// Tag of the `Add` that submitted the statement
    pub add_tag: CommandTag,
    /// Tag of the last command issued for the statement
    pub tag: CommandTag,
    /// Prover errors; empty on success
    pub errors: Vec<CoqExn>,
    /// Sentences left executed in the document; empty on failure
    pub executed_sids: Vec<SentenceId>,
}

impl StatementResult {
    /// True when the prover accepted and executed the whole statement
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
