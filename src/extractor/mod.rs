//! Candidate extraction from Claude Code conversation logs
//!
//! # Error Handling Strategy
//!
//! - **Line-level**: malformed lines are skipped by the parser and never abort a file.
//! - **File-level**: a file that cannot be opened or read is logged and skipped; the
//!   remaining files are still processed.
//! - **Pre-filter**: records matching the exclusion rules are dropped silently (debug log),
//!   they are a normal outcome rather than an error.

pub mod discovery;
pub mod extract;

pub use discovery::discover_log_files;
pub use extract::{
    KnowledgeExtractor, contains_error_signature, day_bounds, read_candidates, write_candidates,
};
