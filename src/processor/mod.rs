//! Batch orchestration
//!
//! Candidates are handled one at a time, in input order, with no retries.
//! Per-candidate failures (a document that cannot be written) are logged and
//! counted; the batch always runs to completion. Files created during a run are
//! committed once, after the loop.

pub mod batch;
pub mod decisions;
pub mod git;

pub use batch::{BatchProcessor, BatchStats, extract_tags, generate_title};
pub use decisions::DecisionStats;
pub use git::commit_files;
