//! JSON transcript of a session
//!
//! The file holds `sent`, `response` and `stderr` arrays/strings next to a
//! little metadata, so a run can be inspected or re-demultiplexed offline
//! with [`Transcript::replay_log`].

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::protocol::ResponseLog;
use crate::types::SessionId;

/// Record of everything sent to and received from one prover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// Session the transcript belongs to
    pub session_id: SessionId,
    /// Command line of the prover, when the session spawned it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_line: Option<String>,
    /// When the session was opened
    pub started_at: DateTime<Utc>,
    /// When the transcript was taken
    pub closed_at: DateTime<Utc>,
    /// Command lines in send order; the index is the tag
    pub sent: Vec<String>,
    /// Response lines in arrival order
    pub response: Vec<String>,
    /// Captured stderr (empty when the session was dropped without closing)
    #[serde(default)]
    pub stderr: String,
}

impl Transcript {
    /// Write as pretty JSON, replacing any existing file
    ///
    /// # Errors
    /// Returns error if serialization or the write fails
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::debug!("Wrote transcript for session {} to {}", self.session_id, path.display());
        Ok(())
    }

    /// Read a transcript written by [`Transcript::save`]
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Rebuild the response log
    #[must_use]
    pub fn replay_log(&self) -> ResponseLog {
        ResponseLog::from_lines(self.response.iter().cloned())
    }
}

/// Transcript file for a source file: `<source>.serapi.json` next to it
#[must_use]
pub fn transcript_path_for(source: &Path) -> PathBuf {
    let mut name = source.as_os_str().to_os_string();
    name.push(".serapi.json");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_path_appends_suffix() {
        assert_eq!(
            transcript_path_for(Path::new("theories/Nat.v")),
            PathBuf::from("theories/Nat.v.serapi.json")
        );
    }
}
