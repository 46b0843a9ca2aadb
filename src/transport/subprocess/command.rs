//! Command building from a launch configuration

use std::process::Stdio;

use tokio::process::Command;

use crate::types::LaunchConfig;

/// Command builder for the prover process
pub struct CommandBuilder<'a> {
    config: &'a LaunchConfig,
}

impl<'a> CommandBuilder<'a> {
    /// Create a new command builder
    pub const fn new(config: &'a LaunchConfig) -> Self {
        Self { config }
    }

    /// Build the command with piped stdio and an authoritative environment
    pub fn build(&self) -> Command {
        let mut cmd = Command::new(&self.config.executable);
        cmd.args(&self.config.args);

        cmd.env_clear();
        cmd.envs(&self.config.env);

        if let Some(ref cwd) = self.config.cwd {
            cmd.current_dir(cwd);
            cmd.env("PWD", cwd);
        }

        // stderr is piped, never inherited, so the prover cannot write over
        // the parent's terminal and its output lands in the transcript
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd
    }
}
