//! Near-duplicate detection against the knowledge base
//!
//! Texts are compared pairwise with TF-IDF cosine similarity. When a pair has
//! no usable vocabulary (empty or stop-word-only text), the comparison falls
//! back to a Jaccard index over whitespace tokens.

pub mod stopwords;
pub mod tfidf;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::{Section, SimilarMatch};

pub const DEFAULT_THRESHOLD: f64 = 0.7;
const PREVIEW_CHARS: usize = 200;

/// Which measure `calculate_similarity` uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimilarityMethod {
    #[default]
    TfIdf,
    Jaccard,
}

#[derive(Debug, Clone, Copy)]
pub struct SimilarityChecker {
    pub threshold: f64,
    pub method: SimilarityMethod,
}

impl Default for SimilarityChecker {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl SimilarityChecker {
    pub fn new(threshold: f64) -> Self {
        Self { threshold, method: SimilarityMethod::TfIdf }
    }

    pub fn with_method(mut self, method: SimilarityMethod) -> Self {
        self.method = method;
        self
    }

    /// Similarity in `[0.0, 1.0]`; 0.0 when either text is empty
    pub fn calculate_similarity(&self, a: &str, b: &str) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        match self.method {
            SimilarityMethod::TfIdf => tfidf_similarity(a, b),
            SimilarityMethod::Jaccard => jaccard_similarity(a, b),
        }
    }

    /// Indices of `existing` items at or above the threshold, most similar first
    pub fn find_duplicates<S: AsRef<str>>(&self, new_item: &str, existing: &[S]) -> Vec<(usize, f64)> {
        let mut duplicates: Vec<(usize, f64)> = existing
            .iter()
            .enumerate()
            .map(|(idx, item)| (idx, self.calculate_similarity(new_item, item.as_ref())))
            .filter(|(_, score)| *score >= self.threshold)
            .collect();

        duplicates.sort_by(|a, b| b.1.total_cmp(&a.1));
        duplicates
    }

    /// Compare `text` against every section of a markdown file.
    ///
    /// A missing file has no duplicates. Read errors are returned to the caller.
    pub fn check_knowledge_file(&self, text: &str, path: &Path) -> Result<Vec<SimilarMatch>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read knowledge file: {}", path.display()))?;

        let mut matches: Vec<SimilarMatch> = split_markdown_sections(&content)
            .into_iter()
            .filter_map(|section| {
                let similarity = self.calculate_similarity(text, &section.text);
                (similarity >= self.threshold).then(|| SimilarMatch {
                    file: path.to_path_buf(),
                    text_preview: preview(&section.text),
                    section: section.title,
                    similarity,
                })
            })
            .collect();

        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        Ok(matches)
    }

    /// Check every `.md` file directly inside `dir`; unreadable files are skipped
    pub fn check_knowledge_dir(&self, text: &str, dir: &Path) -> Vec<SimilarMatch> {
        let mut matches = Vec::new();

        for path in markdown_files(dir) {
            match self.check_knowledge_file(text, &path) {
                Ok(found) => {
                    if !found.is_empty() {
                        debug!("{} similar section(s) in {}", found.len(), path.display());
                    }
                    matches.extend(found);
                }
                Err(e) => warn!("Skipping {}: {:#}", path.display(), e),
            }
        }

        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        matches
    }
}

/// TF-IDF cosine, falling back to Jaccard when the pair has no vocabulary
pub fn tfidf_similarity(a: &str, b: &str) -> f64 {
    tfidf::tfidf_cosine(a, b).unwrap_or_else(|| jaccard_similarity(a, b))
}

/// |A ∩ B| / |A ∪ B| over lowercased whitespace tokens
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    let words_a: HashSet<&str> = a_lower.split_whitespace().collect();
    let words_b: HashSet<&str> = b_lower.split_whitespace().collect();

    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    intersection as f64 / union as f64
}

/// Split markdown into heading-delimited sections.
///
/// Text before the first heading belongs to a section titled "Intro". Sections
/// whose body is blank are dropped.
pub fn split_markdown_sections(content: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current = Section { title: "Intro".to_string(), text: String::new() };

    for line in content.split('\n') {
        if line.starts_with('#') {
            let title = line.trim_matches(|c| c == '#' || c == ' ').trim().to_string();
            let finished = std::mem::replace(&mut current, Section { title, text: String::new() });
            if !finished.text.trim().is_empty() {
                sections.push(finished);
            }
        } else {
            current.text.push_str(line);
            current.text.push('\n');
        }
    }

    if !current.text.trim().is_empty() {
        sections.push(current);
    }

    sections
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    out.push_str("...");
    out
}

fn markdown_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "md"))
        .collect();
    files.sort();
    files
}
