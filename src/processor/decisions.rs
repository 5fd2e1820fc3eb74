use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{error, info, warn};

use super::batch::BatchProcessor;
use super::git;
use crate::models::{Candidate, Decision, EvaluationDecision};
use crate::utils::relative_display;

/// Outcome of `create_from_decisions`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionStats {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub duplicates: usize,
    pub created: usize,
    pub failed: usize,
    pub by_category: BTreeMap<String, usize>,
}

impl BatchProcessor<'_> {
    /// Persist candidates selected by externally produced decisions.
    ///
    /// Every decision other than `reject` is acted on. Indices outside the
    /// candidate list and unusable category names are warned about, skipped and
    /// counted as failed. Duplicates are checked against whole documents in the
    /// decision's category only.
    pub fn create_from_decisions(
        &self,
        candidates: &[Candidate],
        decisions: &[EvaluationDecision],
        date: &str,
    ) -> DecisionStats {
        let mut stats = DecisionStats { total: decisions.len(), ..Default::default() };
        let mut created_files = Vec::new();

        for decision in decisions {
            if decision.decision == Decision::Reject {
                stats.rejected += 1;
                continue;
            }
            stats.accepted += 1;

            let Some(candidate) = decision.index.and_then(|i| candidates.get(i)) else {
                warn!("Invalid candidate index {:?} for '{}'", decision.index, decision.title);
                stats.failed += 1;
                continue;
            };

            let category = decision.category.trim();
            if !is_valid_category(category) {
                warn!("Invalid category '{}' for '{}'", decision.category, decision.title);
                stats.failed += 1;
                continue;
            }

            if self.is_duplicate_in_category(&candidate.text, category) {
                stats.duplicates += 1;
                println!("Skipped duplicate: {}", decision.title);
                continue;
            }

            if self.is_dry_run() {
                println!("Would create: {}/{}", category, decision.title);
                continue;
            }

            match self.store().write_decision_record(
                category,
                &decision.title,
                &candidate.text,
                candidate.timestamp,
                candidate.project_path.as_deref(),
            ) {
                Ok(path) => {
                    println!("Created: {}", relative_display(&path, self.store().repo_path()));
                    created_files.push(path);
                    stats.created += 1;
                    *stats.by_category.entry(category.to_string()).or_insert(0) += 1;
                }
                Err(e) => {
                    error!("Failed to create '{}': {:#}", decision.title, e);
                    stats.failed += 1;
                }
            }
        }

        if !created_files.is_empty() {
            let message = format!("knowledge: add {} items from {}", created_files.len(), date);
            match git::commit_files(self.store().repo_path(), &created_files, &message) {
                Ok(()) => info!("Committed {} files to git", created_files.len()),
                Err(e) => warn!("Git commit failed, files left uncommitted: {:#}", e),
            }
        }

        stats
    }

    fn is_duplicate_in_category(&self, text: &str, category: &str) -> bool {
        let dir = self.store().category_dir(category);
        let Ok(entries) = fs::read_dir(&dir) else {
            return false;
        };

        let mut files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "md"))
            .collect();
        files.sort();

        let checker = self.checker();
        files.iter().any(|path| match fs::read_to_string(path) {
            Ok(existing) => checker.calculate_similarity(text, &existing) >= checker.threshold,
            Err(e) => {
                warn!("Error reading {}: {}", path.display(), e);
                false
            }
        })
    }
}

fn is_valid_category(category: &str) -> bool {
    !category.is_empty()
        && category != "."
        && category != ".."
        && !category.contains(['/', '\\'])
        && !Path::new(category).is_absolute()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::config::Config;
    use crate::models::Role;

    fn decision(index: Option<usize>, decision: Decision, category: &str, title: &str) -> EvaluationDecision {
        EvaluationDecision {
            index,
            decision,
            category: category.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn test_create_from_decisions_counts() {
        let config = Config::bundled().unwrap();
        let repo = TempDir::new().unwrap();
        let processor = BatchProcessor::new(&config, repo.path());

        let candidates = vec![
            Candidate::new(Role::Assistant, "Set the pool size to twice the core count for the worker service"),
            Candidate::new(Role::Assistant, "Rotate the signing keys every ninety days via the vault job"),
        ];
        let decisions = vec![
            decision(Some(0), Decision::Accept, "ops", "Worker pool sizing"),
            decision(Some(1), Decision::Reject, "ops", "Key rotation"),
            decision(Some(7), Decision::Accept, "ops", "Out of range"),
            decision(None, Decision::Maybe, "ops", "No index"),
            decision(Some(1), Decision::Maybe, "../escape", "Bad category"),
        ];

        let stats = processor.create_from_decisions(&candidates, &decisions, "2026-01-31");
        assert_eq!(stats.total, 5);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.accepted, 4);
        assert_eq!(stats.created, 1);
        // two bad indices and one bad category
        assert_eq!(stats.failed, 3);
        assert_eq!(stats.by_category.get("ops"), Some(&1));
        assert!(repo.path().join("ops/Worker pool sizing.md").exists());
    }

    #[test]
    fn test_duplicate_whole_document_skipped() {
        let config = Config::bundled().unwrap();
        let repo = TempDir::new().unwrap();
        let text = "Set the pool size to twice the core count for the worker service";
        fs::create_dir_all(repo.path().join("ops")).unwrap();
        fs::write(repo.path().join("ops/existing.md"), text).unwrap();

        let processor = BatchProcessor::new(&config, repo.path());
        let candidates = vec![Candidate::new(Role::Assistant, text)];
        let decisions = vec![decision(Some(0), Decision::Accept, "ops", "Pool sizing")];

        let stats = processor.create_from_decisions(&candidates, &decisions, "2026-01-31");
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.created, 0);
        assert!(!repo.path().join("ops/Pool sizing.md").exists());
    }

    #[test]
    fn test_category_validation() {
        assert!(is_valid_category("errors"));
        assert!(!is_valid_category(".."));
        assert!(!is_valid_category("a/b"));
        assert!(!is_valid_category(""));
    }
}
