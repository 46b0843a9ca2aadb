//! # coq_serapi
//!
//! Async client for driving the Coq proof assistant through SerAPI's
//! `sertop` toplevel.
//!
//! `sertop` reads S-expression commands on stdin and answers on stdout with
//! tagged lines: `(Answer <tag> Ack)`, any number of answer payloads, then
//! `(Answer <tag> Completed)`, interleaved with `Feedback` noise. A
//! [`Session`] assigns the tags, keeps every line it reads, and resolves each
//! command's answers from that log.
//!
//! ## Quick Start
//!
//! ```no_run
//! use coq_serapi::{LaunchConfig, Session, SessionOptions};
//!
//! # async fn example() -> coq_serapi::Result<()> {
//! let config = LaunchConfig::sertop(["--implicit"])?;
//! let mut session = Session::open(config, SessionOptions::default()).await?;
//!
//! let result = session.execute_statement("Lemma t : True.").await?;
//! assert!(result.is_success());
//!
//! let goals = session.query_goals_completed("").await?;
//! log::info!("goals: {goals}");
//!
//! let transcript = session.close().await?;
//! log::info!("{} commands sent", transcript.sent.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure handling
//!
//! When Coq rejects a statement, [`Session::execute_statement`] cancels every
//! sentence the statement added and returns the `CoqExn`s as data. Faults
//! such as end of stream, a failing `Cancel`, or an ambiguous query answer
//! are returned as [`SerapiError`] and the session refuses further commands.
//!
//! ## Launching
//!
//! ```no_run
//! use std::path::PathBuf;
//! use coq_serapi::{LaunchConfig, LoadPath, SessionOptions};
//!
//! let config = LaunchConfig::builder("/usr/local/bin/sertop")
//!     .load_path(&LoadPath::Recursive {
//!         dir: PathBuf::from("theories"),
//!         coqdir: "MyProject".to_string(),
//!     })
//!     .inherit_env()
//!     .cwd("/work/my-project")
//!     .build();
//!
//! let options = SessionOptions::builder()
//!     .command_timeout(std::time::Duration::from_secs(60))
//!     .transcript_path("/tmp/session.serapi.json")
//!     .build();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod types;

pub use error::{Result, SerapiError};
pub use protocol::{Command, Response, ResponseLog, Window};
pub use session::{Session, SessionState, Transcript, transcript_path_for};
pub use transport::{LineChannel, SubprocessTransport, Transport};
pub use types::{
    AddOutcome, CommandTag, CoqExn, ExecOutcome, LaunchConfig, LaunchConfigBuilder, LoadPath,
    SentenceId, SentenceState, SessionId, SessionOptions, SessionOptionsBuilder, StatementResult,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
