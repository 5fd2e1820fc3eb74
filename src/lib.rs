//! Knowledge Sync - mine Claude Code conversation logs for reusable knowledge
//!
//! The pipeline reads one day of Claude Code session logs from
//! `~/.claude/projects/`, keeps the messages worth remembering, and files them
//! into a git-backed markdown knowledge base:
//!
//! - [`extractor`] turns log lines into [`Candidate`]s, pre-filtered by the exclusion rules
//! - [`evaluator`] scores candidates against the configured rule tables
//! - [`similarity`] detects near-duplicates of existing records
//! - [`categorizer`] picks a category directory and writes the markdown record
//! - [`processor`] runs the whole batch and commits the result
//!
//! # Example
//!
//! ```no_run
//! use knowledge_sync::{Config, Evaluator, KnowledgeExtractor};
//! use chrono::NaiveDate;
//!
//! let config = Config::bundled()?;
//! let extractor = KnowledgeExtractor::new("/Users/alice/.claude/projects", &config.exclusion);
//! let date = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
//!
//! let evaluator = Evaluator::new(&config);
//! for candidate in extractor.extract_for_date(date)? {
//!     let result = evaluator.evaluate(&candidate);
//!     println!("{} {}", result.score, result.decision.as_str());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod categorizer;
pub mod cli;
pub mod config;
pub mod evaluator;
pub mod extractor;
pub mod models;
pub mod parsers;
pub mod processor;
pub mod similarity;
pub mod trigger;
pub mod utils;

// Re-export commonly used types
pub use categorizer::{Categorizer, KnowledgeStore, generate_filename};
pub use config::{Config, ConfigError};
pub use evaluator::Evaluator;
pub use extractor::KnowledgeExtractor;
pub use models::{Candidate, Decision, EvaluationResult, KnowledgeRecord};
pub use processor::{BatchProcessor, BatchStats};
pub use similarity::SimilarityChecker;
pub use trigger::DailyTrigger;
pub use utils::paths::format_path_with_tilde;
