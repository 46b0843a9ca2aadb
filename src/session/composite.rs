//! Statement execution built on the primitives

use futures::Stream;

use crate::error::Result;
use crate::transport::Transport;
use crate::types::StatementResult;

use super::Session;

impl<T: Transport> Session<T> {
    /// Add `text`, execute every sentence it produced, and cancel the whole
    /// `Add` if anything fails.
    ///
    /// Sentences run in the order the prover assigned them. After the first
    /// failing `Exec` nothing else runs, and every sentence of the `Add` is
    /// canceled, including ones that already executed. The document is left
    /// exactly as it was before the statement.
    ///
    /// # Errors
    /// Only faults are errors. A rejected statement is an `Ok` result with
    /// non-empty `errors`.
    pub async fn execute_statement(&mut self, text: &str) -> Result<StatementResult> {
        let added = self.add_completed(text).await?;
        if added.sids.is_empty() {
            log::debug!("[{}] statement produced no sentences: {text:?}", self.id);
        }

        if !added.coq_exns.is_empty() {
            log::warn!(
                "[{}] Add {} rejected, canceling {} sentence(s): {}",
                self.id,
                added.tag,
                added.sids.len(),
                added.coq_exns[0]
            );
            let tag = self.cancel_completed(&added.sids).await?;
            return Ok(StatementResult {
                add_tag: added.tag,
                tag,
                errors: added.coq_exns,
                executed_sids: Vec::new(),
            });
        }

        let mut tag = added.tag;
        for &sid in &added.sids {
            let exec = self.exec_completed(sid).await?;
            tag = exec.tag;
            if !exec.coq_exns.is_empty() {
                log::warn!(
                    "[{}] Exec {sid} failed, canceling all {} sentence(s) of Add {}: {}",
                    self.id,
                    added.sids.len(),
                    added.tag,
                    exec.coq_exns[0]
                );
                let tag = self.cancel_completed(&added.sids).await?;
                return Ok(StatementResult {
                    add_tag: added.tag,
                    tag,
                    errors: exec.coq_exns,
                    executed_sids: Vec::new(),
                });
            }
        }

        self.executed_sids.extend_from_slice(&added.sids);
        Ok(StatementResult {
            add_tag: added.tag,
            tag,
            errors: Vec::new(),
            executed_sids: added.sids,
        })
    }

    /// Execute statements in order, one result each.
    ///
    /// Rejected statements do not stop the run.
    ///
    /// # Errors
    /// Stops at the first fault and returns it; earlier results are dropped
    pub async fn execute_statements<I>(&mut self, statements: I) -> Result<Vec<StatementResult>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut results = Vec::new();
        for statement in statements {
            results.push(self.execute_statement(statement.as_ref()).await?);
        }
        Ok(results)
    }

    /// Execute statements in order, yielding each result as it completes.
    ///
    /// The stream ends after the first fault, which it yields as `Err`.
    pub fn execute_stream<'a, I>(
        &'a mut self,
        statements: I,
    ) -> impl Stream<Item = Result<StatementResult>> + 'a
    where
        I: IntoIterator + 'a,
        I::Item: AsRef<str>,
    {
        async_stream::stream! {
            for statement in statements {
                let result = self.execute_statement(statement.as_ref()).await;
                let fault = result.is_err();
                yield result;
                if fault {
                    break;
                }
            }
        }
    }
}
