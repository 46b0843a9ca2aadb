//! Newtype wrappers for type safety
//!
//! Command tags and sentence ids are both plain integers on the wire; keeping
//! them as distinct types stops one from being passed where the other is
//! expected.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Newtype Wrappers for Type Safety
// ============================================================================

/// Correlation id for one command sent to SerAPI.
///
/// Assigned by the session in strictly increasing order starting at 0. Every
/// `(Answer <tag> ...)` line refers back to the command with that tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandTag(u64);

impl CommandTag {
    /// Create a command tag
    #[must_use]
    pub const fn new(tag: u64) -> Self {
        Self(tag)
    }

    /// Get the raw tag value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommandTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CommandTag {
    fn from(tag: u64) -> Self {
        Self(tag)
    }
}

/// Sentence id assigned by the prover in response to `Add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentenceId(u64);

impl SentenceId {
    /// Create a sentence id
    #[must_use]
    pub const fn new(sid: u64) -> Self {
        Self(sid)
    }

    /// Get the raw sentence id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SentenceId {
    fn from(sid: u64) -> Self {
        Self(sid)
    }
}

/// Session ID newtype, a v4 uuid unless given explicitly
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random session ID
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the session ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_session_ids_differ() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn tags_serialize_as_plain_integers() {
        let json = serde_json::to_string(&vec![CommandTag::new(0), CommandTag::new(7)]).unwrap();
        assert_eq!(json, "[0,7]");
        let sid: SentenceId = serde_json::from_str("12").unwrap();
        assert_eq!(sid, SentenceId::new(12));
    }
}
