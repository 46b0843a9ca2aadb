//! Lifecycle management for subprocess transport (connect, terminate)

use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, SerapiError};
use crate::transport::lines::LineChannel;

use super::command::CommandBuilder;
use super::reader::spawn_stderr_collector;
use super::transport::SubprocessTransport;

impl SubprocessTransport {
    /// Spawn the prover and wire up its standard streams
    ///
    /// # Errors
    /// Returns error if spawning fails or a stdio handle is missing
    pub(super) async fn connect_impl(&mut self) -> Result<()> {
        if self.process.is_some() {
            return Ok(());
        }

        let mut cmd = CommandBuilder::new(&self.config).build();
        let command_line = self.config.command_line();

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                if let Some(ref cwd) = self.config.cwd
                    && !cwd.exists()
                {
                    return SerapiError::connection(format!(
                        "Working directory does not exist: {}",
                        cwd.display()
                    ));
                }
                return SerapiError::connection(format!(
                    "Executable not found: {}",
                    self.config.executable.display()
                ));
            }
            SerapiError::connection(format!("Failed to start `{command_line}`: {e}"))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SerapiError::connection("Failed to get stdin handle"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SerapiError::connection("Failed to get stdout handle"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| SerapiError::connection("Failed to get stderr handle"))?;

        self.stderr_task = Some(spawn_stderr_collector(stderr, Arc::clone(&self.stderr)));
        self.channel = Some(LineChannel::new(stdout, stdin, self.max_line_length));
        log::debug!("Spawned `{command_line}` (pid {:?})", child.id());
        self.process = Some(child);

        Ok(())
    }

    /// Close stdin, wait up to `grace` for exit, then kill
    ///
    /// # Errors
    /// Returns error if waiting on the child fails
    pub(super) async fn terminate_impl(&mut self, grace: Duration) -> Result<Option<i32>> {
        if let Some(channel) = self.channel.as_mut()
            && let Err(e) = channel.shutdown_input().await
        {
            log::debug!("Ignoring stdin shutdown failure during terminate: {e}");
        }

        if let Some(mut child) = self.process.take() {
            match tokio::time::timeout(grace, child.wait()).await {
                Ok(Ok(status)) => {
                    self.exit_status = Some(status);
                }
                Ok(Err(e)) => {
                    return Err(SerapiError::Io(e));
                }
                Err(_) => {
                    log::warn!("sertop did not exit within {grace:?}, killing it");
                    if let Err(e) = child.kill().await {
                        log::warn!("Failed to kill sertop: {e}");
                    }
                    self.exit_status = Some(child.wait().await?);
                }
            }
        }

        Ok(self.exit_status.and_then(|status| status.code()))
    }

    /// Handle Drop cleanup
    pub(super) fn drop_impl(&mut self) {
        // Dropping the channel closes stdin
        self.channel = None;

        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }

        if let Some(mut child) = self.process.take() {
            let _ = child.start_kill();
        }
    }
}
