use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use super::git;
use crate::categorizer::{Categorizer, KnowledgeStore, generate_filename};
use crate::config::Config;
use crate::evaluator::Evaluator;
use crate::models::{Candidate, Decision, KnowledgeRecord, SimilarMatch};
use crate::similarity::{DEFAULT_THRESHOLD, SimilarityChecker};
use crate::utils::{display_line, relative_display};

pub const TITLE_MAX: usize = 60;
const MAX_TAGS: usize = 5;

/// Substring -> tag, checked in this order
const TECH_KEYWORDS: &[(&str, &str)] = &[
    ("python", "python"),
    ("javascript", "javascript"),
    ("typescript", "typescript"),
    ("java", "java"),
    ("docker", "docker"),
    ("kubernetes", "kubernetes"),
    ("git", "git"),
    ("api", "api"),
    ("database", "database"),
    ("security", "security"),
    ("performance", "performance"),
    ("test", "testing"),
    ("debug", "debugging"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub duplicates: usize,
    pub created: usize,
    pub failed: usize,
}

/// Runs candidates through evaluate -> dedupe -> categorize -> persist -> commit
pub struct BatchProcessor<'a> {
    config: &'a Config,
    store: KnowledgeStore,
    checker: SimilarityChecker,
    dry_run: bool,
    verbose: bool,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(config: &'a Config, repo_path: impl Into<PathBuf>) -> Self {
        Self {
            config,
            store: KnowledgeStore::new(repo_path),
            checker: SimilarityChecker::new(DEFAULT_THRESHOLD),
            dry_run: false,
            verbose: false,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.checker.threshold = threshold;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    pub fn checker(&self) -> &SimilarityChecker {
        &self.checker
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Process candidates strictly in order. Files written here are committed
    /// together once the loop finishes; a failed commit is logged only.
    pub fn process_candidates(&self, candidates: &[Candidate], date: &str) -> BatchStats {
        let evaluator = Evaluator::new(self.config);
        let categorizer = Categorizer::new(&self.config.categories);
        let total = candidates.len();

        let mut stats = BatchStats { total, ..Default::default() };
        let mut created_files = Vec::new();

        info!("Processing {} candidates for {}", total, date);

        for (i, candidate) in candidates.iter().enumerate() {
            let position = i + 1;
            let result = evaluator.evaluate(candidate);

            if result.decision != Decision::Accept {
                stats.rejected += 1;
                if self.verbose {
                    println!("[{}/{}] Rejected (score: {})", position, total, result.score);
                    if let Some(reason) = &result.excluded_by {
                        println!("   Reason: {}", reason);
                    }
                }
                continue;
            }

            stats.accepted += 1;
            if self.verbose {
                println!("[{}/{}] Accepted (score: {})", position, total, result.score);
            }

            let text = candidate.text.as_str();
            let similar = self.find_similar_knowledge(text);
            if let Some(top) = similar.first() {
                stats.duplicates += 1;
                debug!("Candidate {} duplicates {} ({:.2})", position, top.file.display(), top.similarity);
                if self.verbose {
                    println!(
                        "   Similar to: {} ({:.0}%)",
                        relative_display(&top.file, self.store.repo_path()),
                        top.similarity * 100.0
                    );
                }
                continue;
            }

            let category = categorizer.categorize(text, None);
            let title = generate_title(text, TITLE_MAX);
            if self.verbose {
                println!("   Category: {}", category);
                println!("   Title: {}", display_line(&title));
            }

            if self.dry_run {
                if self.verbose {
                    println!("   Would create file (dry run)");
                }
                continue;
            }

            let record = KnowledgeRecord {
                title: title.clone(),
                category: category.to_string(),
                tags: extract_tags(category, text),
                body: text.to_string(),
                metadata: vec![
                    ("date".to_string(), date.to_string()),
                    ("score".to_string(), result.score.to_string()),
                    ("source_file".to_string(), candidate.source_display()),
                ],
            };
            let filename = generate_filename(&title, date, None);

            match self.store.create_knowledge_file(&record, &filename) {
                Ok(path) => {
                    if self.verbose {
                        println!("   Created: {}", relative_display(&path, self.store.repo_path()));
                    }
                    created_files.push(path);
                    stats.created += 1;
                }
                Err(e) => {
                    error!("Failed to persist candidate {}: {:#}", position, e);
                    stats.failed += 1;
                }
            }
        }

        if !created_files.is_empty() && !self.dry_run {
            let message = format!(
                "Add {} knowledge items from {}\n\nAuto-generated by daily-knowledge-sync",
                created_files.len(),
                date
            );
            match git::commit_files(self.store.repo_path(), &created_files, &message) {
                Ok(()) => info!("Committed {} files to git", created_files.len()),
                Err(e) => warn!("Git commit failed, files left uncommitted: {:#}", e),
            }
        }

        stats
    }

    /// Matching sections across every configured category, most similar first
    pub fn find_similar_knowledge(&self, text: &str) -> Vec<SimilarMatch> {
        let mut matches: Vec<SimilarMatch> = self
            .config
            .categories
            .names()
            .flat_map(|name| self.checker.check_knowledge_dir(text, &self.store.category_dir(name)))
            .collect();

        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        matches
    }
}

/// Title from the first non-empty line of `text`: heading markers stripped, cut back to a
/// word boundary with `...` when longer than `max_length` characters.
pub fn generate_title(text: &str, max_length: usize) -> String {
    let line = text
        .lines()
        .map(|l| l.trim().trim_start_matches('#').trim())
        .find(|l| !l.is_empty())
        .unwrap_or_default();

    let title = if line.chars().count() > max_length {
        let cut: String = line.chars().take(max_length).collect();
        let head = match cut.rsplit_once(' ') {
            Some((head, _)) => head.to_string(),
            None => cut,
        };
        format!("{}...", head)
    } else {
        line.to_string()
    };

    if title.is_empty() { "Knowledge item".to_string() } else { title }
}

/// The category followed by any technology keywords found in the text, at most five
pub fn extract_tags(category: &str, text: &str) -> Vec<String> {
    let text_lower = text.to_lowercase();
    let mut tags = vec![category.to_string()];

    for (keyword, tag) in TECH_KEYWORDS {
        if text_lower.contains(keyword) && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }

    tags.truncate(MAX_TAGS);
    tags
}
