//! Background collection of the child's error stream

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Spawn a task that drains `stderr` into `buffer` until EOF.
///
/// Draining continuously keeps a chatty prover from blocking on a full pipe
/// while the session is busy waiting for stdout.
pub(super) fn spawn_stderr_collector<R>(stderr: R, buffer: Arc<Mutex<String>>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    log::debug!("sertop stderr: {line}");
                    let mut buffer = buffer.lock().await;
                    buffer.push_str(&line);
                    buffer.push('\n');
                }
                Ok(None) => break,
                Err(e) => {
                    log::warn!("Stopped reading sertop stderr: {e}");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collects_until_eof() {
        let stderr = tokio_test::io::Builder::new()
            .read(b"Warning: loaded\nError: ")
            .read(b"oops\n")
            .build();
        let buffer = Arc::new(Mutex::new(String::new()));
        spawn_stderr_collector(stderr, Arc::clone(&buffer))
            .await
            .unwrap();
        assert_eq!(*buffer.lock().await, "Warning: loaded\nError: oops\n");
    }
}
