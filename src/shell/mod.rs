//! Shell Module
//!
//! Line-oriented command interpreter over a `StorageEngine`.
//!
//! ## Command Format
//! One command per line, keywords case-insensitive:
//! - `CREATE name size`
//! - `WRITE name offset "content"`
//! - `READ name offset length`
//! - `DELETE name`
//! - `LIST`, `STAT name`
//! - `SAVE [path]`, `LOAD [path]`
//! - `HELP`, `EXIT`
//!
//! ## Replies
//! Each command maps to exactly one engine call. Successes render as a
//! short message; failures render as `error: <message>` and never end the
//! session.

mod command;
mod reply;
mod session;

pub use command::{Command, CommandType};
pub use reply::{Reply, HELP_TEXT};
pub use session::{Outcome, Session};
