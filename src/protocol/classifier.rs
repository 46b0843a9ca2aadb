//! Classification of raw `sertop` output lines
//!
//! Only `(Answer <tag> ...)` lines carry anything the engine correlates.
//! `Feedback` lines and anything else are `Unrecognized` noise. `sertop`
//! prints machine-format sexps without a space before nested lists, so
//! `(Answer 0(Added 2 ...))` and `(Answer 0 (Added 2 ...))` are equivalent.

use crate::types::{CommandTag, CoqExn, SentenceId};

/// One classified response line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// First line emitted for a command
    Ack {
        /// Command the line answers
        tag: CommandTag,
    },
    /// A sentence id produced by `Add`
    Added {
        /// Command the line answers
        tag: CommandTag,
        /// Assigned sentence id
        sid: SentenceId,
    },
    /// A prover error
    CoqExn {
        /// Command the line answers
        tag: CommandTag,
        /// The error payload
        exn: CoqExn,
    },
    /// Last line emitted for a command
    Completed {
        /// Command the line answers
        tag: CommandTag,
    },
    /// Any other answer payload, e.g. `(ObjList ...)`
    Payload {
        /// Command the line answers
        tag: CommandTag,
        /// Trimmed payload text
        payload: String,
    },
    /// Not an answer line
    Unrecognized,
}

impl Response {
    /// The command this line answers, if any
    #[must_use]
    pub const fn tag(&self) -> Option<CommandTag> {
        match self {
            Self::Ack { tag }
            | Self::Added { tag, .. }
            | Self::CoqExn { tag, .. }
            | Self::Completed { tag }
            | Self::Payload { tag, .. } => Some(*tag),
            Self::Unrecognized => None,
        }
    }
}

/// Classify one response line
#[must_use]
pub fn classify(line: &str) -> Response {
    let Some((tag, payload)) = split_answer(line.trim()) else {
        return Response::Unrecognized;
    };

    match payload {
        "Completed" => Response::Completed { tag },
        "Ack" => Response::Ack { tag },
        _ => {
            if let Some(sid) = parse_added(payload) {
                Response::Added { tag, sid }
            } else if is_coq_exn(payload) {
                Response::CoqExn {
                    tag,
                    exn: CoqExn::new(payload),
                }
            } else {
                Response::Payload {
                    tag,
                    payload: payload.to_string(),
                }
            }
        }
    }
}

/// `(Answer <ws> <digits> <rest>)` into the tag and the trimmed rest.
///
/// The rest runs up to the last `)` on the line.
fn split_answer(line: &str) -> Option<(CommandTag, &str)> {
    let rest = line.strip_prefix("(Answer")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let tag = rest[..digits].parse::<u64>().ok()?;
    let rest = &rest[digits..];
    let close = rest.rfind(')')?;
    Some((CommandTag::new(tag), rest[..close].trim()))
}

/// `(Added <ws> <digits> ...)` into the sentence id
fn parse_added(payload: &str) -> Option<SentenceId> {
    let rest = payload.strip_prefix("(Added")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || !rest[digits..].contains(')') {
        return None;
    }
    rest[..digits].parse::<u64>().ok().map(SentenceId::new)
}

fn is_coq_exn(payload: &str) -> bool {
    payload
        .strip_prefix("(CoqExn")
        .is_some_and(|rest| rest.starts_with(|c: char| c == '(' || c.is_whitespace()))
        && payload.ends_with(')')
}
