//! Shared test transports
//!
//! `ScriptedProver` answers commands the way `sertop` does, with a tiny
//! sentence model: text is split on `.`, a sentence containing
//! `SYNTAX_ERROR` fails to parse, and one containing `FAIL` fails to execute.
//! `CannedOutput` ignores what it is sent and plays back fixed lines.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use coq_serapi::protocol::unquote;
use coq_serapi::{Result, SerapiError, Transport};

/// Initialize logging for tests
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Fake prover speaking the SerAPI answer protocol
#[derive(Debug, Default)]
pub struct ScriptedProver {
    received: Vec<String>,
    output: VecDeque<String>,
    sentences: HashMap<u64, String>,
    next_sid: u64,
    connected: bool,
    input_closed: bool,
    terminated: bool,
    feedback: bool,
    duplicate_query_answers: bool,
    fail_cancel: bool,
    hang_up_on: Option<u64>,
    stall_on: Option<u64>,
    hung_up: bool,
    stalled: bool,
    stderr: String,
}

impl ScriptedProver {
    pub fn new() -> Self {
        Self {
            next_sid: 2,
            ..Self::default()
        }
    }

    /// Interleave `Feedback` lines with the answers
    pub fn with_feedback(mut self) -> Self {
        self.feedback = true;
        self
    }

    /// Answer every query twice
    pub fn with_duplicate_query_answers(mut self) -> Self {
        self.duplicate_query_answers = true;
        self
    }

    /// Report a `CoqExn` for every `Cancel`
    pub fn with_failing_cancel(mut self) -> Self {
        self.fail_cancel = true;
        self
    }

    /// Close the output stream right after acknowledging command `tag`
    pub fn hang_up_on(mut self, tag: u64) -> Self {
        self.hang_up_on = Some(tag);
        self
    }

    /// Acknowledge command `tag` and then never answer again
    pub fn stall_on(mut self, tag: u64) -> Self {
        self.stall_on = Some(tag);
        self
    }

    /// Text the prover writes to stderr
    pub fn with_stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.to_string();
        self
    }

    /// Commands received, in order
    pub fn received(&self) -> &[String] {
        &self.received
    }

    /// Whether `terminate` was called
    pub fn was_terminated(&self) -> bool {
        self.terminated
    }

    fn emit(&mut self, line: String) {
        self.output.push_back(line);
    }

    fn feedback(&mut self, sid: u64) {
        if self.feedback {
            self.emit(format!(
                "(Feedback((doc_id 0)(span_id {sid})(route 0)(contents Processed)))"
            ));
        }
    }

    fn respond(&mut self, tag: u64, command: &str) {
        self.emit(format!("(Answer {tag} Ack)"));
        if self.hang_up_on == Some(tag) {
            self.feedback(0);
            self.hung_up = true;
            return;
        }
        if self.stall_on == Some(tag) {
            self.stalled = true;
            return;
        }

        if let Some(quoted) = command
            .strip_prefix("(Add () \"")
            .and_then(|rest| rest.strip_suffix("\")"))
        {
            self.respond_add(tag, &unquote(quoted));
        } else if let Some(sid) = command
            .strip_prefix("(Exec ")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            self.respond_exec(tag, sid);
        } else if let Some(sids) = command
            .strip_prefix("(Cancel (")
            .and_then(|rest| rest.strip_suffix("))"))
        {
            if self.fail_cancel {
                self.emit(format!(
                    "(Answer {tag}(CoqExn((loc())(stm_ids())(str\"Invalid_argument\"))))"
                ));
            } else {
                for sid in sids.split_whitespace().filter_map(|s| s.parse::<u64>().ok()) {
                    self.sentences.remove(&sid);
                }
                self.emit(format!("(Answer {tag}(Canceled({sids})))"));
            }
        } else if command.starts_with("(Query") {
            let answer = if command.ends_with("Goals)") {
                format!(
                    "(Answer {tag}(ObjList((CoqString\"{} sentence(s) known\"))))",
                    self.sentences.len()
                )
            } else {
                format!("(Answer {tag}(ObjList((CoqConstr(Ind((Coq.Init.Datatypes.nat 0)))))))")
            };
            self.emit(answer.clone());
            if self.duplicate_query_answers {
                self.emit(answer);
            }
        } else {
            self.emit(format!(
                "(Answer {tag}(CoqExn((loc())(stm_ids())(str\"Unknown command\"))))"
            ));
        }
        self.emit(format!("(Answer {tag} Completed)"));
    }

    fn respond_add(&mut self, tag: u64, text: &str) {
        for sentence in text.split_inclusive('.') {
            let sentence = sentence.trim();
            if !sentence.ends_with('.') || sentence == "." {
                continue;
            }
            if sentence.contains("SYNTAX_ERROR") {
                self.emit(format!(
                    "(Answer {tag}(CoqExn((loc())(stm_ids())(str\"Syntax error: illegal begin of vernac.\"))))"
                ));
                return;
            }
            let sid = self.next_sid;
            self.next_sid += 1;
            self.sentences.insert(sid, sentence.to_string());
            self.emit(format!(
                "(Answer {tag}(Added {sid}((fname ToplevelInput)(line_nb 1))NewTip))"
            ));
            self.feedback(sid);
        }
    }

    fn respond_exec(&mut self, tag: u64, sid: &str) {
        let sentence = sid
            .parse::<u64>()
            .ok()
            .and_then(|sid| self.sentences.get(&sid))
            .cloned();
        match sentence {
            Some(text) if text.contains("FAIL") => {
                self.emit(format!(
                    "(Answer {tag}(CoqExn((loc())(stm_ids())(str\"Tactic failure.\"))))"
                ));
            }
            Some(_) => {
                if let Ok(sid) = sid.parse() {
                    self.feedback(sid);
                }
            }
            None => {
                self.emit(format!(
                    "(Answer {tag}(CoqExn((loc())(stm_ids())(str\"Invalid_argument stm\"))))"
                ));
            }
        }
    }
}

impl Transport for ScriptedProver {
    async fn connect(&mut self) -> Result<()> {
        self.connected = true;
        Ok(())
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        if !self.connected || self.input_closed || self.terminated {
            return Err(SerapiError::transport("input closed", None));
        }
        let tag = self.received.len() as u64;
        self.received.push(line.to_string());
        self.respond(tag, line);
        Ok(())
    }

    async fn read_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.output.pop_front() {
            return Ok(Some(line));
        }
        if self.stalled && !self.terminated {
            std::future::pending::<()>().await;
        }
        Ok(None)
    }

    async fn end_input(&mut self) -> Result<()> {
        self.input_closed = true;
        Ok(())
    }

    async fn read_all_error(&mut self) -> Result<String> {
        Ok(self.stderr.clone())
    }

    fn is_alive(&mut self) -> bool {
        self.connected && !self.terminated && !self.hung_up
    }

    fn exit_code(&mut self) -> Option<i32> {
        if self.hung_up {
            Some(1)
        } else if self.terminated {
            Some(0)
        } else {
            None
        }
    }

    async fn terminate(&mut self, _grace: Duration) -> Result<Option<i32>> {
        self.terminated = true;
        Ok(self.exit_code())
    }
}

/// Transport that plays back fixed output regardless of input
#[derive(Debug, Default)]
pub struct CannedOutput {
    written: Vec<String>,
    output: VecDeque<String>,
}

impl CannedOutput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            written: Vec::new(),
            output: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn written(&self) -> &[String] {
        &self.written
    }
}

impl Transport for CannedOutput {
    async fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.written.push(line.to_string());
        Ok(())
    }

    async fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.output.pop_front())
    }

    async fn end_input(&mut self) -> Result<()> {
        Ok(())
    }

    async fn read_all_error(&mut self) -> Result<String> {
        Ok(String::new())
    }

    fn is_alive(&mut self) -> bool {
        !self.output.is_empty()
    }

    fn exit_code(&mut self) -> Option<i32> {
        None
    }

    async fn terminate(&mut self, _grace: Duration) -> Result<Option<i32>> {
        Ok(None)
    }
}
