//! Append-only response log with an incremental per-tag index
//!
//! Every line read from the prover is kept verbatim and never reordered.
//! Alongside the raw lines the log keeps, per tag, the position of that tag's
//! most recent `Ack` and the positions of its answer lines since then. That
//! is the same window a backward scan from the tail would find (stop at the
//! tag's latest `Ack`, skip other tags, skip `Completed`), computed as lines
//! arrive instead of on every lookup. Only positions are indexed; the text
//! of a fragment is re-read from its line when a window is built.

use std::collections::HashMap;

use crate::types::{CommandTag, CoqExn, SentenceId};

use super::classifier::{Response, classify};

#[derive(Debug, Default, Clone)]
struct TagIndex {
    ack: Option<usize>,
    completed: Option<usize>,
    lines: Vec<usize>,
}

/// Fragments collected for one tag, in arrival order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Window {
    /// Sentence ids from `Added` answers
    pub sids: Vec<SentenceId>,
    /// Prover errors
    pub coq_exns: Vec<CoqExn>,
    /// Any other answer payloads
    pub payloads: Vec<String>,
}

/// All response lines of a session, in arrival order
#[derive(Debug, Default, Clone)]
pub struct ResponseLog {
    lines: Vec<String>,
    index: HashMap<CommandTag, TagIndex>,
}

impl ResponseLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from previously recorded lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut log = Self::new();
        for line in lines {
            log.push(line);
        }
        log
    }

    /// Append one line and return its classification
    pub fn push(&mut self, line: impl Into<String>) -> Response {
        let line = line.into();
        let position = self.lines.len();
        let response = classify(&line);

        if let Some(tag) = response.tag() {
            let entry = self.index.entry(tag).or_default();
            match &response {
                Response::Ack { .. } => {
                    entry.ack = Some(position);
                    entry.completed = None;
                    entry.lines.clear();
                }
                Response::Completed { .. } => entry.completed = Some(position),
                _ => entry.lines.push(position),
            }
        }

        self.lines.push(line);
        response
    }

    /// Fragments answering `tag` since its most recent `Ack`
    #[must_use]
    pub fn window(&self, tag: CommandTag) -> Window {
        let mut window = Window::default();
        let Some(entry) = self.index.get(&tag) else {
            return window;
        };
        for &position in &entry.lines {
            match classify(&self.lines[position]) {
                Response::Added { sid, .. } => window.sids.push(sid),
                Response::CoqExn { exn, .. } => window.coq_exns.push(exn),
                Response::Payload { payload, .. } => window.payloads.push(payload),
                Response::Ack { .. } | Response::Completed { .. } | Response::Unrecognized => {}
            }
        }
        window
    }

    /// Whether `tag`'s `Completed` marker has been logged since its last `Ack`
    #[must_use]
    pub fn is_completed(&self, tag: CommandTag) -> bool {
        self.index
            .get(&tag)
            .is_some_and(|entry| entry.completed.is_some())
    }

    /// Raw lines in arrival order
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines logged
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when nothing has been logged
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(n: u64) -> CommandTag {
        CommandTag::new(n)
    }

    fn sids(ids: &[u64]) -> Vec<SentenceId> {
        ids.iter().copied().map(SentenceId::new).collect()
    }

    #[test]
    fn window_collects_sids_in_arrival_order() {
        let log = ResponseLog::from_lines([
            "(Answer 0 Ack)",
            "(Answer 0 (Added 2 loc NewTip))",
            "(Feedback((doc_id 0)(span_id 2)(contents Processed)))",
            "(Answer 0 (Added 3 loc NewTip))",
            "(Answer 0 Completed)",
        ]);
        let window = log.window(tag(0));
        assert_eq!(window.sids, sids(&[2, 3]));
        assert!(window.coq_exns.is_empty());
        assert!(log.is_completed(tag(0)));
        assert_eq!(log.len(), 5);
    }

    #[test]
    fn other_tags_are_noise_not_terminators() {
        let log = ResponseLog::from_lines([
            "(Answer 0 Ack)",
            "(Answer 0 (Added 2 loc NewTip))",
            "(Answer 0 Completed)",
            "(Answer 1 Ack)",
            "(Answer 1 (Added 3 loc NewTip))",
            "(Answer 0 (Added 9 stray NewTip))",
            "(Answer 1 (CoqExn (bad)))",
            "(Answer 1 Completed)",
        ]);
        let window = log.window(tag(1));
        assert_eq!(window.sids, sids(&[3]));
        assert_eq!(window.coq_exns, vec![CoqExn::new("(CoqExn (bad))")]);
        assert_eq!(log.window(tag(0)).sids, sids(&[2, 9]));
    }

    #[test]
    fn window_starts_at_most_recent_ack() {
        let log = ResponseLog::from_lines([
            "(Answer 4 Ack)",
            "(Answer 4 (ObjList old))",
            "(Answer 4 Ack)",
            "(Answer 4 (ObjList new))",
            "(Answer 4 Completed)",
        ]);
        assert_eq!(log.window(tag(4)).payloads, vec!["(ObjList new)".to_string()]);
    }

    #[test]
    fn window_lookup_is_repeatable() {
        let log = ResponseLog::from_lines([
            "(Answer 2 Ack)",
            "(Answer 2 (CoqExn (one)))",
            "(Answer 2 (CoqExn (two)))",
            "(Answer 2 Completed)",
        ]);
        let first = log.window(tag(2));
        assert_eq!(first, log.window(tag(2)));
        assert_eq!(
            first.coq_exns,
            vec![CoqExn::new("(CoqExn (one))"), CoqExn::new("(CoqExn (two))")]
        );
    }

    #[test]
    fn push_reports_the_classification() {
        let mut log = ResponseLog::new();
        assert_eq!(log.push("(Answer 3 Ack)"), Response::Ack { tag: tag(3) });
        assert_eq!(
            log.push("(Answer 3(ObjList()))"),
            Response::Payload {
                tag: tag(3),
                payload: "(ObjList())".to_string()
            }
        );
        assert_eq!(log.push("noise"), Response::Unrecognized);
        assert_eq!(log.lines(), ["(Answer 3 Ack)", "(Answer 3(ObjList()))", "noise"]);
        assert_eq!(log.window(tag(3)).payloads, vec!["(ObjList())".to_string()]);
    }

    #[test]
    fn unknown_tag_has_empty_window() {
        let log = ResponseLog::from_lines(["(Answer 0 Ack)"]);
        assert_eq!(log.window(tag(7)), Window::default());
        assert!(!log.is_completed(tag(0)));
        assert!(!log.is_completed(tag(7)));
        assert!(ResponseLog::new().is_empty());
    }
}
