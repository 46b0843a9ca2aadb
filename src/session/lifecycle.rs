//! Opening and closing sessions

use chrono::Utc;

use crate::error::Result;
use crate::transport::{SubprocessTransport, Transport};
use crate::types::{LaunchConfig, SessionOptions};

use super::transcript::Transcript;
use super::{Session, SessionState};

impl Session<SubprocessTransport> {
    /// Spawn the process described by `config` and open a session on it
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the process cannot start
    pub async fn open(config: LaunchConfig, options: SessionOptions) -> Result<Self> {
        let command_line = config.command_line();
        let transport =
            SubprocessTransport::new(config)?.with_max_line_length(options.max_line_length);
        Self::start(transport, options, Some(command_line)).await
    }
}

impl<T: Transport> Session<T> {
    /// Open a session over an existing transport, connecting it if needed
    ///
    /// # Errors
    /// Returns error if the transport fails to connect
    pub async fn with_transport(transport: T, options: SessionOptions) -> Result<Self> {
        Self::start(transport, options, None).await
    }

    async fn start(
        mut transport: T,
        options: SessionOptions,
        command_line: Option<String>,
    ) -> Result<Self> {
        transport.connect().await?;
        let session = Self::from_parts(transport, options, command_line);
        log::info!(
            "Opened session {} ({})",
            session.id,
            session.command_line.as_deref().unwrap_or("custom transport")
        );
        Ok(session)
    }

    /// Shut the prover down and return the transcript.
    ///
    /// Closes the prover's input, logs whatever output is still pending,
    /// collects stderr, and waits for the process to exit (killing it after
    /// `shutdown_timeout`). The transcript is written to `transcript_path`
    /// when one is configured. Works on dead sessions too.
    ///
    /// # Errors
    /// Returns error if the transcript cannot be written or the process
    /// cannot be reaped
    pub async fn close(mut self) -> Result<Transcript> {
        let grace = self.options.shutdown_timeout;

        if let Err(e) = self.transport.end_input().await {
            log::debug!("Ignoring failure to close sertop input: {e}");
        }

        let drained = tokio::time::timeout(grace, async {
            let mut count = 0usize;
            while let Ok(Some(line)) = self.transport.read_line().await {
                log::trace!("[{}] <- {line}", self.id);
                self.log.push(line);
                count += 1;
            }
            count
        })
        .await;
        match drained {
            Ok(count) => log::debug!("[{}] drained {count} trailing line(s)", self.id),
            Err(_) => log::warn!("[{}] output still open after {grace:?}", self.id),
        }

        let exit_code = self.transport.terminate(grace).await;

        let stderr = match tokio::time::timeout(grace, self.transport.read_all_error()).await {
            Ok(Ok(stderr)) => stderr,
            Ok(Err(e)) => {
                log::warn!("[{}] failed to collect stderr: {e}", self.id);
                String::new()
            }
            Err(_) => {
                log::warn!("[{}] stderr still open after {grace:?}", self.id);
                String::new()
            }
        };

        self.state = SessionState::Closed;
        let transcript = self.transcript(stderr);
        log::info!(
            "Closed session {} after {} command(s), exit code {:?}",
            self.id,
            self.sent.len(),
            exit_code.as_ref().ok().copied().flatten()
        );

        if let Some(ref path) = self.options.transcript_path {
            transcript.save(path)?;
        }
        exit_code?;
        Ok(transcript)
    }

    pub(super) fn transcript(&self, stderr: String) -> Transcript {
        Transcript {
            session_id: self.id.clone(),
            command_line: self.command_line.clone(),
            started_at: self.started_at,
            closed_at: Utc::now(),
            sent: self.sent.clone(),
            response: self.log.lines().to_vec(),
            stderr,
        }
    }
}
