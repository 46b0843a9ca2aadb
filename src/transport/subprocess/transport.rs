//! Subprocess transport over a spawned prover

use std::process::ExitStatus;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::{Child, ChildStdin, ChildStdout};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::Transport;
use crate::error::{Result, SerapiError};
use crate::transport::lines::LineChannel;
use crate::types::LaunchConfig;
use crate::types::options::DEFAULT_MAX_LINE_LENGTH;

/// Subprocess transport for `sertop`
pub struct SubprocessTransport {
    pub(super) config: LaunchConfig,
    pub(super) max_line_length: usize,
    pub(super) process: Option<Child>,
    pub(super) channel: Option<LineChannel<ChildStdout, ChildStdin>>,
    pub(super) stderr: Arc<Mutex<String>>,
    pub(super) stderr_task: Option<JoinHandle<()>>,
    pub(super) exit_status: Option<ExitStatus>,
}

impl SubprocessTransport {
    /// Create a transport for the given launch configuration.
    ///
    /// Nothing is spawned until [`Transport::connect`].
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the configuration fails validation
    pub fn new(config: LaunchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            process: None,
            channel: None,
            stderr: Arc::new(Mutex::new(String::new())),
            stderr_task: None,
            exit_status: None,
        })
    }

    /// Cap the length of a single output line
    #[must_use]
    pub const fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    /// The launch configuration this transport spawns
    #[must_use]
    pub const fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Process id of the running child
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().and_then(Child::id)
    }

    /// Record the exit status if the child has exited
    pub(super) fn poll_exit(&mut self) -> Option<ExitStatus> {
        if self.exit_status.is_none()
            && let Some(child) = self.process.as_mut()
            && let Ok(Some(status)) = child.try_wait()
        {
            self.exit_status = Some(status);
        }
        self.exit_status
    }

    fn channel_mut(&mut self) -> Result<&mut LineChannel<ChildStdout, ChildStdin>> {
        self.channel
            .as_mut()
            .ok_or_else(|| SerapiError::connection("Not connected - call connect() first"))
    }
}

impl Transport for SubprocessTransport {
    async fn connect(&mut self) -> Result<()> {
        self.connect_impl().await
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        if let Some(status) = self.poll_exit() {
            return Err(SerapiError::transport(
                format!("sertop exited ({status}) before the command could be sent"),
                status.code(),
            ));
        }
        self.channel_mut()?.write_line(line).await
    }

    async fn read_line(&mut self) -> Result<Option<String>> {
        self.channel_mut()?.read_line().await
    }

    async fn end_input(&mut self) -> Result<()> {
        match self.channel.as_mut() {
            Some(channel) => channel.shutdown_input().await,
            None => Ok(()),
        }
    }

    async fn read_all_error(&mut self) -> Result<String> {
        if let Some(task) = self.stderr_task.as_mut() {
            if let Err(e) = task.await {
                log::warn!("stderr collector ended abnormally: {e}");
            }
            self.stderr_task = None;
        }
        Ok(self.stderr.lock().await.clone())
    }

    fn is_alive(&mut self) -> bool {
        self.process.is_some() && self.poll_exit().is_none()
    }

    fn exit_code(&mut self) -> Option<i32> {
        self.poll_exit().and_then(|status| status.code())
    }

    async fn terminate(&mut self, grace: Duration) -> Result<Option<i32>> {
        self.terminate_impl(grace).await
    }
}

impl Drop for SubprocessTransport {
    fn drop(&mut self) {
        self.drop_impl();
    }
}
