//! Launch configuration and session options
//!
//! [`LaunchConfig`] identifies exactly one child process to spawn. It is
//! normally produced by whatever selected the Coq toolchain; the helpers here
//! cover the two common shapes (plain `sertop` on PATH, or `sertop` run inside
//! an opam switch).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SerapiError};

/// Name of the SerAPI toplevel binary
pub const SERTOP: &str = "sertop";

/// Default time allowed for the child to exit on close
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Default maximum length of a single response line (16 MiB)
pub const DEFAULT_MAX_LINE_LENGTH: usize = 16 * 1024 * 1024;

// ============================================================================
// Launch Configuration
// ============================================================================

/// Process-launch configuration for a SerAPI child.
///
/// The `env` mapping is authoritative: the child sees exactly these variables
/// and nothing inherited. Use [`LaunchConfigBuilder::inherit_env`] to start
/// from the parent's environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Executable to run
    pub executable: PathBuf,
    /// Arguments passed to the executable
    #[serde(default)]
    pub args: Vec<String>,
    /// Complete environment of the child
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Working directory of the child (inherits the parent's when unset)
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

impl LaunchConfig {
    /// Create a new builder for `LaunchConfig`
    #[must_use]
    pub fn builder(executable: impl Into<PathBuf>) -> LaunchConfigBuilder {
        LaunchConfigBuilder::new(executable)
    }

    /// `sertop` from PATH, with the current environment.
    ///
    /// # Errors
    /// Returns `ExecutableNotFound` if `sertop` is not on PATH
    pub fn sertop<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let executable =
            which::which(SERTOP).map_err(|_| SerapiError::executable_not_found(SERTOP))?;
        Ok(Self::builder(executable).args(args).inherit_env().build())
    }

    /// `opam exec [--root R] --switch S -- sertop <args>`.
    ///
    /// opam sets up the switch environment itself, so the child only gets
    /// `HOME` (when the parent has one).
    #[must_use]
    pub fn opam_sertop<I, S>(switch: &str, opam_root: Option<&Path>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = Self::builder("opam").arg("exec");
        if let Some(root) = opam_root {
            builder = builder.arg("--root").arg(root.to_string_lossy());
        }
        builder = builder.arg("--switch").arg(switch).arg("--").arg(SERTOP).args(args);
        if let Ok(home) = std::env::var("HOME") {
            builder = builder.env("HOME", home);
        }
        builder.build()
    }

    /// Human-readable command line, for logs and transcripts
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.executable.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Check the configuration before spawning.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for an empty executable or a missing working directory
    pub fn validate(&self) -> Result<()> {
        if self.executable.as_os_str().is_empty() {
            return Err(SerapiError::invalid_config("executable path is empty"));
        }
        if let Some(ref cwd) = self.cwd
            && !cwd.is_dir()
        {
            return Err(SerapiError::invalid_config(format!(
                "working directory does not exist: {}",
                cwd.display()
            )));
        }
        Ok(())
    }
}

/// A Coq load-path mapping rendered into sertop arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadPath {
    /// `-I dir`: OCaml load path
    Ml(PathBuf),
    /// `-Q dir,coqdir`: map `dir` to the logical path `coqdir`
    Bind {
        /// Physical directory
        dir: PathBuf,
        /// Logical Coq path
        coqdir: String,
    },
    /// `-R dir,coqdir`: like `Bind` but recursive
    Recursive {
        /// Physical directory
        dir: PathBuf,
        /// Logical Coq path
        coqdir: String,
    },
}

impl LoadPath {
    /// Render as sertop arguments
    #[must_use]
    pub fn sertop_args(&self) -> [String; 2] {
        match self {
            Self::Ml(dir) => ["-I".to_string(), dir.to_string_lossy().into_owned()],
            Self::Bind { dir, coqdir } => {
                ["-Q".to_string(), format!("{},{coqdir}", dir.to_string_lossy())]
            }
            Self::Recursive { dir, coqdir } => {
                ["-R".to_string(), format!("{},{coqdir}", dir.to_string_lossy())]
            }
        }
    }
}

// ============================================================================
// Launch Configuration Builder
// ============================================================================

/// Builder for [`LaunchConfig`]
#[derive(Debug, Clone)]
pub struct LaunchConfigBuilder {
    config: LaunchConfig,
}

impl LaunchConfigBuilder {
    /// Start a configuration for the given executable with an empty environment
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            config: LaunchConfig {
                executable: executable.into(),
                args: Vec::new(),
                env: HashMap::new(),
                cwd: None,
            },
        }
    }

    /// Append one argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.config.args.push(arg.into());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append the sertop flags for a load-path mapping
    #[must_use]
    pub fn load_path(mut self, load_path: &LoadPath) -> Self {
        self.config.args.extend(load_path.sertop_args());
        self
    }

    /// Set one environment variable
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.env.insert(key.into(), value.into());
        self
    }

    /// Copy the parent process environment (explicit `env` calls still win)
    #[must_use]
    pub fn inherit_env(mut self) -> Self {
        for (key, value) in std::env::vars() {
            self.config.env.entry(key).or_insert(value);
        }
        self
    }

    /// Set the working directory
    #[must_use]
    pub fn cwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.cwd = Some(path.into());
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> LaunchConfig {
        self.config
    }
}

// ============================================================================
// Session Options
// ============================================================================

/// Options that shape how a session drives its channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Deadline for each command's `Completed` marker. On expiry the child is
    /// terminated and the session is dead. `None` waits forever.
    pub command_timeout: Option<Duration>,
    /// Time allowed on close for draining output and for the child to exit
    pub shutdown_timeout: Duration,
    /// Where to write the JSON transcript on teardown
    pub transcript_path: Option<PathBuf>,
    /// Longest accepted response line in bytes
    pub max_line_length: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            command_timeout: None,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            transcript_path: None,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl SessionOptions {
    /// Create a new builder for `SessionOptions`
    #[must_use]
    pub fn builder() -> SessionOptionsBuilder {
        SessionOptionsBuilder::default()
    }
}

/// Builder for [`SessionOptions`]
#[derive(Debug, Default)]
pub struct SessionOptionsBuilder {
    options: SessionOptions,
}

impl SessionOptionsBuilder {
    /// Set the per-command timeout
    #[must_use]
    pub const fn command_timeout(mut self, timeout: Duration) -> Self {
        self.options.command_timeout = Some(timeout);
        self
    }

    /// Set the shutdown timeout
    #[must_use]
    pub const fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.options.shutdown_timeout = timeout;
        self
    }

    /// Persist the transcript to this path on teardown
    #[must_use]
    pub fn transcript_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.transcript_path = Some(path.into());
        self
    }

    /// Set the maximum response line length
    ///
    /// # Panics
    /// Panics if `bytes` is zero
    #[must_use]
    pub fn max_line_length(mut self, bytes: usize) -> Self {
        assert!(bytes > 0, "max_line_length must be positive");
        self.options.max_line_length = bytes;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> SessionOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_args_env_and_load_paths() {
        let config = LaunchConfig::builder("/usr/bin/sertop")
            .arg("--implicit")
            .load_path(&LoadPath::Recursive {
                dir: PathBuf::from("/proj/theories"),
                coqdir: "Proj".to_string(),
            })
            .load_path(&LoadPath::Ml(PathBuf::from("/proj/plugin")))
            .env("COQLIB", "/lib/coq")
            .cwd("/proj")
            .build();

        assert_eq!(
            config.args,
            vec!["--implicit", "-R", "/proj/theories,Proj", "-I", "/proj/plugin"]
        );
        assert_eq!(config.env.get("COQLIB").map(String::as_str), Some("/lib/coq"));
        assert_eq!(config.cwd, Some(PathBuf::from("/proj")));
        assert_eq!(
            config.command_line(),
            "/usr/bin/sertop --implicit -R /proj/theories,Proj -I /proj/plugin"
        );
    }

    #[test]
    fn opam_sertop_renders_switch_invocation() {
        let config =
            LaunchConfig::opam_sertop("coq-8.16", Some(Path::new("/opt/opam")), ["-Q", "a,b"]);
        assert_eq!(config.executable, PathBuf::from("opam"));
        assert_eq!(
            config.args,
            vec!["exec", "--root", "/opt/opam", "--switch", "coq-8.16", "--", "sertop", "-Q", "a,b"]
        );
        assert!(config.env.keys().all(|k| k == "HOME"));
    }

    #[test]
    fn explicit_env_wins_over_inherited() {
        let config = LaunchConfig::builder("sertop")
            .env("PATH", "/custom")
            .inherit_env()
            .build();
        assert_eq!(config.env.get("PATH").map(String::as_str), Some("/custom"));
    }

    #[test]
    fn validate_rejects_missing_cwd() {
        let config = LaunchConfig::builder("sertop")
            .cwd("/definitely/not/a/real/dir")
            .build();
        assert!(matches!(config.validate(), Err(SerapiError::InvalidConfig(_))));
        assert!(LaunchConfig::builder("").build().validate().is_err());
    }

    #[test]
    fn session_options_defaults() {
        let options = SessionOptions::default();
        assert_eq!(options.command_timeout, None);
        assert_eq!(options.shutdown_timeout, Duration::from_secs(5));
        assert_eq!(options.max_line_length, DEFAULT_MAX_LINE_LENGTH);

        let options = SessionOptions::builder()
            .command_timeout(Duration::from_secs(30))
            .transcript_path("/tmp/t.json")
            .build();
        assert_eq!(options.command_timeout, Some(Duration::from_secs(30)));
        assert_eq!(options.transcript_path, Some(PathBuf::from("/tmp/t.json")));
    }
}
