//! Newline-framed reading and writing over a pair of async streams

use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

use crate::error::{Result, SerapiError};

/// Line channel over any reader/writer pair
///
/// Output lines come through a [`LinesCodec`] capped at `max_line_length`,
/// so a runaway line fails with [`SerapiError::LineTooLong`] instead of
/// growing the buffer without bound.
#[derive(Debug)]
pub struct LineChannel<R, W> {
    reader: FramedRead<R, LinesCodec>,
    writer: Option<W>,
    max_line_length: usize,
}

impl<R, W> LineChannel<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Wrap a reader and a writer
    pub fn new(reader: R, writer: W, max_line_length: usize) -> Self {
        Self {
            reader: FramedRead::new(reader, LinesCodec::new_with_max_length(max_line_length)),
            writer: Some(writer),
            max_line_length,
        }
    }

    /// Write `line` followed by a newline, then flush
    ///
    /// # Errors
    /// Returns a transport error if input was already closed or the write fails
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| SerapiError::transport("input stream already closed", None))?;

        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| SerapiError::transport(format!("Failed to write to stdin: {e}"), None))?;
        writer
            .write_all(b"\n")
            .await
            .map_err(|e| SerapiError::transport(format!("Failed to write to stdin: {e}"), None))?;
        writer
            .flush()
            .await
            .map_err(|e| SerapiError::transport(format!("Failed to flush stdin: {e}"), None))?;
        Ok(())
    }

    /// Next line, or `None` at end of stream
    ///
    /// # Errors
    /// Returns `LineTooLong` or `Io` on a failed read
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        match self.reader.next().await {
            None => Ok(None),
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                Err(SerapiError::LineTooLong(self.max_line_length))
            }
            Some(Err(LinesCodecError::Io(e))) => Err(SerapiError::Io(e)),
        }
    }

    /// Shut down and drop the writer. Idempotent.
    ///
    /// # Errors
    /// Returns a transport error if the shutdown fails
    pub async fn shutdown_input(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .shutdown()
                .await
                .map_err(|e| SerapiError::transport(format!("Failed to close stdin: {e}"), None))?;
        }
        Ok(())
    }

    /// Whether the writer has been shut down
    #[must_use]
    pub const fn input_closed(&self) -> bool {
        self.writer.is_none()
    }
}
