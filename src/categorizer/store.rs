use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use super::filename::sanitize_filename;
use crate::models::KnowledgeRecord;

const INDEX_FILE: &str = "README.md";

/// A knowledge repository laid out as one directory per category
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    repo_path: PathBuf,
}

impl KnowledgeStore {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self { repo_path: repo_path.into() }
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.repo_path.join(category)
    }

    /// Create the category directory and its index document on first use
    pub fn ensure_category(&self, category: &str) -> Result<PathBuf> {
        let dir = self.category_dir(category);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create category directory: {}", dir.display()))?;

        let index = dir.join(INDEX_FILE);
        if !index.exists() {
            fs::write(&index, format!("# {}\n\n", title_case(category)))
                .with_context(|| format!("Failed to write {}", index.display()))?;
            debug!("Created category index {}", index.display());
        }

        Ok(dir)
    }

    /// Write a record under its category. An existing file is never
    /// overwritten; the name gets a `-2`, `-3`, ... suffix instead.
    pub fn create_knowledge_file(&self, record: &KnowledgeRecord, filename: &str) -> Result<PathBuf> {
        let dir = self.ensure_category(&record.category)?;
        let path = unique_path(&dir, filename, |n| numbered(filename, n));

        fs::write(&path, record.render())
            .with_context(|| format!("Failed to write knowledge file: {}", path.display()))?;
        Ok(path)
    }

    /// Write a reviewed item as `<category>/<sanitized title>.md`.
    ///
    /// On a name collision the candidate timestamp is appended as
    /// `_YYYYmmdd_HHMMSS`.
    pub fn write_decision_record(
        &self,
        category: &str,
        title: &str,
        text: &str,
        timestamp: Option<DateTime<Utc>>,
        project_path: Option<&str>,
    ) -> Result<PathBuf> {
        let dir = self.category_dir(category);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create category directory: {}", dir.display()))?;

        let stem = sanitize_filename(title);
        let filename = format!("{}.md", stem);
        let stamp = timestamp.unwrap_or_else(Utc::now).format("%Y%m%d_%H%M%S").to_string();
        let path = unique_path(&dir, &filename, |n| {
            if n == 2 {
                format!("{}_{}.md", stem, stamp)
            } else {
                format!("{}_{}-{}.md", stem, stamp, n - 1)
            }
        });

        let mut content = format!("# {}\n\n", title);
        if let Some(project) = project_path.filter(|p| !p.is_empty()) {
            content.push_str(&format!("**Project**: `{}`\n\n", project));
        }
        let when = timestamp
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| "unknown".to_string());
        content.push_str(&format!("**Timestamp**: {}\n\n---\n\n{}\n", when, text.trim()));

        fs::write(&path, content)
            .with_context(|| format!("Failed to write knowledge file: {}", path.display()))?;
        Ok(path)
    }
}

/// First of `dir/filename`, `dir/alt(2)`, `dir/alt(3)`, ... that does not exist
fn unique_path(dir: &Path, filename: &str, alt: impl Fn(usize) -> String) -> PathBuf {
    let mut path = dir.join(filename);
    let mut n = 2;
    while path.exists() {
        path = dir.join(alt(n));
        n += 1;
    }
    path
}

fn numbered(filename: &str, n: usize) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) => format!("{}-{}.{}", stem, n, ext),
        None => format!("{}-{}", filename, n),
    }
}

/// Capitalize the first letter of every alphabetic run: `dev-ops` -> `Dev-Ops`
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::TempDir;

    use super::*;

    fn record(category: &str) -> KnowledgeRecord {
        KnowledgeRecord {
            title: "Fix import error".to_string(),
            category: category.to_string(),
            tags: vec![category.to_string(), "python".to_string()],
            body: "Use a relative import.".to_string(),
            metadata: vec![("date".to_string(), "2026-01-31".to_string())],
        }
    }

    #[test]
    fn test_create_writes_index_and_record() {
        let dir = TempDir::new().unwrap();
        let store = KnowledgeStore::new(dir.path());

        let path = store.create_knowledge_file(&record("errors"), "2026-01-31_fix.md").unwrap();
        assert_eq!(path, dir.path().join("errors/2026-01-31_fix.md"));
        assert_eq!(fs::read_to_string(dir.path().join("errors/README.md")).unwrap(), "# Errors\n\n");

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("---\ntitle: Fix import error\ncategory: errors\n"));
        assert!(content.contains("tags: [errors, python]"));
        assert!(content.ends_with("# Fix import error\n\nUse a relative import.\n"));
    }

    #[test]
    fn test_existing_index_is_kept() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("ops")).unwrap();
        fs::write(dir.path().join("ops/README.md"), "# Custom\n").unwrap();

        KnowledgeStore::new(dir.path()).ensure_category("ops").unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("ops/README.md")).unwrap(), "# Custom\n");
    }

    #[test]
    fn test_collisions_get_numeric_suffix() {
        let dir = TempDir::new().unwrap();
        let store = KnowledgeStore::new(dir.path());

        let first = store.create_knowledge_file(&record("errors"), "note.md").unwrap();
        let second = store.create_knowledge_file(&record("errors"), "note.md").unwrap();
        let third = store.create_knowledge_file(&record("errors"), "note.md").unwrap();

        assert!(first.ends_with("note.md"));
        assert!(second.ends_with("note-2.md"));
        assert!(third.ends_with("note-3.md"));
    }

    #[test]
    fn test_decision_record_layout_and_collision() {
        let dir = TempDir::new().unwrap();
        let store = KnowledgeStore::new(dir.path());
        let ts = Utc.with_ymd_and_hms(2026, 1, 31, 10, 5, 9).unwrap();

        let first = store
            .write_decision_record("errors", "Fix: a/b", "  body text \n", Some(ts), Some("/work/app"))
            .unwrap();
        assert_eq!(first, dir.path().join("errors/Fix_ a_b.md"));
        assert_eq!(
            fs::read_to_string(&first).unwrap(),
            "# Fix: a/b\n\n**Project**: `/work/app`\n\n**Timestamp**: 2026-01-31T10:05:09Z\n\n---\n\nbody text\n"
        );

        let second =
            store.write_decision_record("errors", "Fix: a/b", "other", Some(ts), None).unwrap();
        assert_eq!(second, dir.path().join("errors/Fix_ a_b_20260131_100509.md"));
        assert!(!fs::read_to_string(&second).unwrap().contains("**Project**"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("errors"), "Errors");
        assert_eq!(title_case("dev-ops"), "Dev-Ops");
    }
}
