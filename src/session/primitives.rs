//! Protocol primitives: send one command, wait for it, read its window

use std::time::Duration;

use crate::error::{Result, SerapiError};
use crate::protocol::{Command, Response};
use crate::transport::Transport;
use crate::types::{AddOutcome, CommandTag, ExecOutcome, SentenceId, SentenceState};

use super::Session;

impl<T: Transport> Session<T> {
    async fn send(&mut self, command: Command) -> Result<CommandTag> {
        self.ensure_open()?;
        let tag = self.next_tag();
        let line = command.to_sexp();
        log::debug!("[{}] {} {tag} -> {line}", self.id, command.kind());

        let written = self.transport.write_line(&line).await;
        self.guard(written)?;
        self.sent.push(line);
        Ok(tag)
    }

    /// Send `(Add () "<text>")` without waiting for it
    ///
    /// # Errors
    /// Returns error if the session is not open or the write fails
    pub async fn add(&mut self, text: &str) -> Result<CommandTag> {
        self.send(Command::Add {
            text: text.to_string(),
        })
        .await
    }

    /// Send `(Exec <sid>)` without waiting for it
    ///
    /// # Errors
    /// Returns error if the session is not open or the write fails
    pub async fn exec(&mut self, sid: SentenceId) -> Result<CommandTag> {
        self.send(Command::Exec { sid }).await
    }

    /// Send `(Cancel (<sids>))` without waiting for it
    ///
    /// # Errors
    /// Returns error if the session is not open or the write fails
    pub async fn cancel(&mut self, sids: &[SentenceId]) -> Result<CommandTag> {
        self.send(Command::Cancel {
            sids: sids.to_vec(),
        })
        .await
    }

    /// Send `(Query (<opts>) Goals)` without waiting for it
    ///
    /// # Errors
    /// Returns error if the session is not open or the write fails
    pub async fn query_goals(&mut self, opts: &str) -> Result<CommandTag> {
        self.send(Command::QueryGoals {
            opts: opts.to_string(),
        })
        .await
    }

    /// Send `(Query () (Definition <name>))` without waiting for it
    ///
    /// # Errors
    /// Returns error if the session is not open or the write fails
    pub async fn query_definition(&mut self, name: &str) -> Result<CommandTag> {
        self.send(Command::QueryDefinition {
            name: name.to_string(),
        })
        .await
    }

    /// Read and log lines until `(Answer <tag> Completed)` arrives.
    ///
    /// Returns the length of the response log at that point. A tag whose
    /// `Completed` marker is already logged returns immediately. With a
    /// `command_timeout` configured, expiry terminates the prover.
    ///
    /// # Errors
    /// `Protocol` if `tag` was never sent; the session stays open.
    /// `Transport` if the output stream ends first, `Timeout` on expiry.
    /// Both leave the session dead.
    pub async fn wait_for_completion(&mut self, tag: CommandTag) -> Result<usize> {
        self.ensure_open()?;
        if tag >= self.next_tag() {
            return Err(SerapiError::protocol(format!(
                "command {tag} has not been sent (next tag is {})",
                self.next_tag()
            )));
        }
        if self.log.is_completed(tag) {
            return Ok(self.log.len());
        }
        let result = match self.options.command_timeout {
            None => self.read_until_completed(tag).await,
            Some(limit) => {
                match tokio::time::timeout(limit, self.read_until_completed(tag)).await {
                    Ok(result) => result,
                    Err(_) => {
                        if let Err(e) = self.transport.terminate(Duration::ZERO).await {
                            log::warn!("Failed to terminate sertop after timeout: {e}");
                        }
                        Err(SerapiError::timeout(format!(
                            "command {tag} did not complete within {limit:?}"
                        )))
                    }
                }
            }
        };
        self.guard(result)
    }

    async fn read_until_completed(&mut self, tag: CommandTag) -> Result<usize> {
        loop {
            let Some(line) = self.transport.read_line().await? else {
                let exit_code = self.transport.exit_code();
                return Err(SerapiError::transport(
                    format!("end of stream while waiting for command {tag} to complete"),
                    exit_code,
                ));
            };
            log::trace!("[{}] <- {line}", self.id);
            if matches!(self.log.push(line), Response::Completed { tag: done } if done == tag) {
                return Ok(self.log.len());
            }
        }
    }

    /// `Add` and wait; returns the sentence ids and prover errors
    ///
    /// # Errors
    /// Returns error on any transport fault
    pub async fn add_completed(&mut self, text: &str) -> Result<AddOutcome> {
        let tag = self.add(text).await?;
        self.wait_for_completion(tag).await?;

        let window = self.log.window(tag);
        for &sid in &window.sids {
            self.transition(sid, SentenceState::Added);
        }
        self.added_sids.push((tag, window.sids.clone()));

        Ok(AddOutcome {
            tag,
            sids: window.sids,
            coq_exns: window.coq_exns,
        })
    }

    /// `Exec` and wait; returns prover errors
    ///
    /// # Errors
    /// Returns error on any transport fault
    pub async fn exec_completed(&mut self, sid: SentenceId) -> Result<ExecOutcome> {
        let tag = self.exec(sid).await?;
        self.wait_for_completion(tag).await?;

        let coq_exns = self.log.window(tag).coq_exns;
        if coq_exns.is_empty() {
            self.transition(sid, SentenceState::Executed);
        }
        Ok(ExecOutcome { tag, coq_exns })
    }

    /// `Cancel` and wait.
    ///
    /// # Errors
    /// A `CoqExn` in the answer is a protocol fault: the prover refused to
    /// drop sentences and the document state is no longer known.
    pub async fn cancel_completed(&mut self, sids: &[SentenceId]) -> Result<CommandTag> {
        let tag = self.cancel(sids).await?;
        self.wait_for_completion(tag).await?;

        let coq_exns = self.log.window(tag).coq_exns;
        if let Some(exn) = coq_exns.first() {
            let fault = SerapiError::protocol(format!(
                "Cancel {tag} of {sids:?} reported {} CoqExn(s), first: {exn}",
                coq_exns.len()
            ));
            return self.guard(Err(fault));
        }
        for &sid in sids {
            self.transition(sid, SentenceState::Canceled);
        }
        Ok(tag)
    }

    /// `Query Goals` and wait; returns the single answer payload
    ///
    /// # Errors
    /// `Protocol` if the answer carries a `CoqExn` or is not exactly one payload
    pub async fn query_goals_completed(&mut self, opts: &str) -> Result<String> {
        let tag = self.query_goals(opts).await?;
        self.single_answer(tag, "Query Goals").await
    }

    /// `Query Definition` and wait; returns the single answer payload
    ///
    /// # Errors
    /// `Protocol` if the answer carries a `CoqExn` or is not exactly one payload
    pub async fn query_definition_completed(&mut self, name: &str) -> Result<String> {
        let tag = self.query_definition(name).await?;
        self.single_answer(tag, "Query Definition").await
    }

    async fn single_answer(&mut self, tag: CommandTag, kind: &str) -> Result<String> {
        self.wait_for_completion(tag).await?;

        let window = self.log.window(tag);
        let fault = if let Some(exn) = window.coq_exns.first() {
            SerapiError::protocol(format!("{kind} {tag} reported CoqExn: {exn}"))
        } else if !window.sids.is_empty() {
            SerapiError::protocol(format!("{kind} {tag} answered with sentence ids"))
        } else {
            match <[String; 1]>::try_from(window.payloads) {
                Ok([payload]) => return Ok(payload),
                Err(payloads) => SerapiError::protocol(format!(
                    "{kind} {tag} expected exactly one answer, got {}",
                    payloads.len()
                )),
            }
        };
        self.guard(Err(fault))
    }
}
