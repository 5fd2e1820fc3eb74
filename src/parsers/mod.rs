//! JSONL parsing for Claude Code conversation logs
//!
//! # Error Handling Strategy
//!
//! Parsing follows a **graceful degradation** approach suitable for CLI tools:
//!
//! - **Individual line failures**: Malformed JSON lines are logged and skipped, so a
//!   single bad line never breaks extraction for the rest of the file.
//!
//! - **File failures**: Only opening or reading the file itself is an error; callers
//!   log it and move on to the next file.
//!
//! - **User feedback**: A warning summarises how many lines were skipped per file.

pub mod deserializers;
pub mod log_file;

pub use log_file::{ParsedLog, parse_log_file};
