//! The SerAPI protocol engine
//!
//! A [`Session`] owns one prover process and the whole conversation with it:
//! the tag counter, every command sent, every response line read, and the
//! lifecycle of each sentence. Commands are strictly sequential. Each
//! `*_completed` call reads until its own `Completed` marker before the next
//! command may be sent.
//!
//! Prover errors come back as [`CoqExn`](crate::CoqExn) values inside the
//! result records. Transport and protocol faults come back as `Err` and leave
//! the session [`SessionState::Dead`]; every later command fails with
//! [`SerapiError::SessionDead`].

mod composite;
mod lifecycle;
mod primitives;
pub mod transcript;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::{Result, SerapiError};
use crate::protocol::ResponseLog;
use crate::transport::{SubprocessTransport, Transport};
use crate::types::{CommandTag, SentenceId, SentenceState, SessionId, SessionOptions};

pub use transcript::{Transcript, transcript_path_for};

/// Whether a session still accepts commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting commands
    Open,
    /// A fault desynchronised the session; carries the reason
    Dead(String),
    /// Shut down through [`Session::close`]
    Closed,
}

/// One conversation with a SerAPI process
pub struct Session<T: Transport = SubprocessTransport> {
    id: SessionId,
    transport: T,
    options: SessionOptions,
    command_line: Option<String>,
    started_at: DateTime<Utc>,
    state: SessionState,
    sent: Vec<String>,
    log: ResponseLog,
    added_sids: Vec<(CommandTag, Vec<SentenceId>)>,
    executed_sids: Vec<SentenceId>,
    sentences: BTreeMap<SentenceId, SentenceState>,
}

impl<T: Transport> Session<T> {
    fn from_parts(transport: T, options: SessionOptions, command_line: Option<String>) -> Self {
        Self {
            id: SessionId::generate(),
            transport,
            options,
            command_line,
            started_at: Utc::now(),
            state: SessionState::Open,
            sent: Vec::new(),
            log: ResponseLog::new(),
            added_sids: Vec::new(),
            executed_sids: Vec::new(),
            sentences: BTreeMap::new(),
        }
    }

    /// Session id, used in logs and transcripts
    #[must_use]
    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// True while commands are accepted
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open)
    }

    /// Options the session was opened with
    #[must_use]
    pub const fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Every command line sent, in order. The index of a command is its tag.
    #[must_use]
    pub fn sent_commands(&self) -> &[String] {
        &self.sent
    }

    /// Every response line read so far
    #[must_use]
    pub const fn response_log(&self) -> &ResponseLog {
        &self.log
    }

    /// Sentence ids produced by each completed `Add`, keyed by its tag
    #[must_use]
    pub fn added_sids(&self) -> &[(CommandTag, Vec<SentenceId>)] {
        &self.added_sids
    }

    /// Sentences of every statement that executed cleanly, in order
    #[must_use]
    pub fn executed_sids(&self) -> &[SentenceId] {
        &self.executed_sids
    }

    /// Lifecycle position of one sentence, if the prover ever assigned it
    #[must_use]
    pub fn sentence_state(&self, sid: SentenceId) -> Option<SentenceState> {
        self.sentences.get(&sid).copied()
    }

    /// The tag the next command will receive
    #[must_use]
    pub fn next_tag(&self) -> CommandTag {
        CommandTag::new(self.sent.len() as u64)
    }

    /// Borrow the transport
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    fn ensure_open(&self) -> Result<()> {
        match &self.state {
            SessionState::Open => Ok(()),
            SessionState::Dead(reason) => Err(SerapiError::session_dead(reason.clone())),
            SessionState::Closed => Err(SerapiError::session_dead("session was closed")),
        }
    }

    /// Mark the session dead when `result` carries a fatal error
    fn guard<V>(&mut self, result: Result<V>) -> Result<V> {
        if let Err(ref e) = result
            && e.is_fatal()
            && self.is_open()
        {
            log::error!("Session {} is no longer usable: {e}", self.id);
            self.state = SessionState::Dead(e.to_string());
        }
        result
    }

    /// Move `sid` to `next`. `Canceled` is terminal.
    fn transition(&mut self, sid: SentenceId, next: SentenceState) {
        let state = self.sentences.entry(sid).or_insert(next);
        if !state.is_terminal() {
            *state = next;
        }
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        if matches!(self.state, SessionState::Closed) {
            return;
        }
        if let Some(path) = self.options.transcript_path.clone() {
            let transcript = self.transcript(String::new());
            if let Err(e) = transcript.save(&path) {
                log::warn!("Failed to write transcript to {}: {e}", path.display());
            }
        }
    }
}
