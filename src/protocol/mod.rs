//! SerAPI wire protocol
//!
//! - [`encoder`] renders commands as S-expression lines
//! - [`classifier`] turns one response line into a [`Response`]
//! - [`response_log`] keeps every response line and answers per-tag window lookups

pub mod classifier;
pub mod encoder;
pub mod response_log;

pub use classifier::{Response, classify};
pub use encoder::{
    Command, encode_add, encode_cancel, encode_exec, encode_query_definition, encode_query_goals,
    quote, unquote,
};
pub use response_log::{ResponseLog, Window};
