//! Data models for the knowledge pipeline.
//!
//! - [`LogRecord`] - one line of a Claude Code conversation log
//! - [`Candidate`] - a normalized record eligible for scoring
//! - [`EvaluationResult`] - score, decision and reasons for one candidate
//! - [`KnowledgeRecord`] - a persisted markdown document
//!
//! Log timestamps go through the lenient deserializer in
//! `parsers::deserializers`, which accepts RFC3339 strings and epoch millis.

pub mod candidate;
pub mod evaluation;
pub mod knowledge;
pub mod log;
pub mod role;

pub use candidate::{Candidate, ToolUse};
pub use evaluation::{Decision, EvaluationDecision, EvaluationResult};
pub use knowledge::{KnowledgeRecord, Section, SimilarMatch};
pub use log::{ContentBlock, LogRecord, Message, MessageContent, NormalizedContent};
pub use role::Role;
