//! S-expression rendering of outgoing commands

use std::fmt;

use crate::types::SentenceId;

/// Quote a string for embedding in a SerAPI string literal.
///
/// Backslashes are doubled before quotes are escaped, so the backslash
/// introduced for a quote is never doubled again.
#[must_use]
pub fn quote(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Inverse of [`quote`]
#[must_use]
pub fn unquote(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// A command understood by `sertop`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Parse text into sentences
    Add {
        /// Unquoted prover input
        text: String,
    },
    /// Execute one sentence
    Exec {
        /// Sentence to execute
        sid: SentenceId,
    },
    /// Remove sentences from the document
    Cancel {
        /// Sentences to cancel
        sids: Vec<SentenceId>,
    },
    /// Ask for the current goals
    QueryGoals {
        /// Query options, inserted verbatim inside the option list
        opts: String,
    },
    /// Ask for the definition of a constant
    QueryDefinition {
        /// Qualified or short name
        name: String,
    },
}

impl Command {
    /// Short name used in logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Add { .. } => "Add",
            Self::Exec { .. } => "Exec",
            Self::Cancel { .. } => "Cancel",
            Self::QueryGoals { .. } => "Query Goals",
            Self::QueryDefinition { .. } => "Query Definition",
        }
    }

    /// Render the command as one line of S-expression text (no newline)
    #[must_use]
    pub fn to_sexp(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add { text } => write!(f, "(Add () \"{}\")", quote(text)),
            Self::Exec { sid } => write!(f, "(Exec {sid})"),
            Self::Cancel { sids } => {
                f.write_str("(Cancel (")?;
                for (i, sid) in sids.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{sid}")?;
                }
                f.write_str("))")
            }
            Self::QueryGoals { opts } => write!(f, "(Query ({opts}) Goals)"),
            Self::QueryDefinition { name } => write!(f, "(Query () (Definition {name}))"),
        }
    }
}

/// `(Add () "<text>")`
#[must_use]
pub fn encode_add(text: &str) -> String {
    Command::Add {
        text: text.to_string(),
    }
    .to_sexp()
}

/// `(Exec <sid>)`
#[must_use]
pub fn encode_exec(sid: SentenceId) -> String {
    Command::Exec { sid }.to_sexp()
}

/// `(Cancel (<sid> ...))`
#[must_use]
pub fn encode_cancel(sids: &[SentenceId]) -> String {
    Command::Cancel {
        sids: sids.to_vec(),
    }
    .to_sexp()
}

/// `(Query (<opts>) Goals)`
#[must_use]
pub fn encode_query_goals(opts: &str) -> String {
    Command::QueryGoals {
        opts: opts.to_string(),
    }
    .to_sexp()
}

/// `(Query () (Definition <name>))`
#[must_use]
pub fn encode_query_definition(name: &str) -> String {
    Command::QueryDefinition {
        name: name.to_string(),
    }
    .to_sexp()
}
