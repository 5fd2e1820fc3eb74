use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::RegexSet;
use tracing::{debug, info, warn};

use super::discovery::discover_log_files;
use crate::config::ExclusionRules;
use crate::models::{Candidate, LogRecord};
use crate::parsers::parse_log_file;

/// Stack-trace and exception signatures that mark a text as an error report
static ERROR_SIGNATURES: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"Traceback \(most recent call last\)",
        r"\b[A-Z][A-Za-z]*(Error|Exception)\b",
        r"thread '[^']*' panicked at",
        r"error\[E\d{4}\]",
        r"(?m)^\s+at \S+ \(.+:\d+(:\d+)?\)",
        r"(?m)^\s+at [\w.$]+\([\w.]+:\d+\)",
        r"(?i)segmentation fault|core dumped",
        r"(?im)^\s*(fatal|error|exception)\b:",
    ])
    .expect("Valid error signature regexes")
});

/// UTC bounds `[start, start + 24h)` of a calendar day
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Whether the text carries a stack trace or exception signature
pub fn contains_error_signature(text: &str) -> bool {
    ERROR_SIGNATURES.is_match(text)
}

/// Extracts knowledge candidates from conversation logs
pub struct KnowledgeExtractor<'a> {
    projects_dir: PathBuf,
    exclusion: &'a ExclusionRules,
}

impl<'a> KnowledgeExtractor<'a> {
    pub fn new(projects_dir: impl Into<PathBuf>, exclusion: &'a ExclusionRules) -> Self {
        Self { projects_dir: projects_dir.into(), exclusion }
    }

    /// Extract all candidates for one calendar day, in file-then-line order
    ///
    /// Files that fail to open or read are logged and skipped.
    pub fn extract_for_date(&self, date: NaiveDate) -> Result<Vec<Candidate>> {
        let files = discover_log_files(&self.projects_dir)?;
        info!("Found {} log files under {}", files.len(), self.projects_dir.display());

        let mut all = Vec::new();
        for file in files {
            match self.extract_from_file(&file, date) {
                Ok(candidates) => {
                    if !candidates.is_empty() {
                        info!("{}: {} candidates", file.display(), candidates.len());
                    }
                    all.extend(candidates);
                }
                Err(e) => warn!("Failed to extract from {}: {:#}", file.display(), e),
            }
        }

        Ok(all)
    }

    /// Extract candidates from a single log file
    pub fn extract_from_file(&self, path: &Path, date: NaiveDate) -> Result<Vec<Candidate>> {
        let parsed = parse_log_file(path)?;
        let (start, end) = day_bounds(date);

        let mut candidates = Vec::new();
        let mut excluded = 0usize;
        // First working directory seen in the file; later records without
        // their own `cwd` inherit it.
        let mut session_cwd: Option<String> = None;

        for (line_num, record) in parsed.records {
            let own_cwd = record.cwd.clone().filter(|c| !c.is_empty());
            if session_cwd.is_none() {
                session_cwd = own_cwd.clone();
            }

            let Some(timestamp) = record.timestamp else {
                continue;
            };
            if timestamp < start || timestamp >= end {
                continue;
            }

            let project_path = own_cwd.or_else(|| session_cwd.clone());
            match self.build_candidate(record, timestamp, path, line_num, project_path) {
                Built::Candidate(candidate) => candidates.push(candidate),
                Built::Excluded(reason) => {
                    debug!("{}:{} excluded ({})", path.display(), line_num, reason);
                    excluded += 1;
                }
                Built::Empty => {}
            }
        }

        if excluded > 0 {
            debug!("{}: {} records excluded by pre-filter", path.display(), excluded);
        }

        Ok(candidates)
    }

    fn build_candidate(
        &self,
        record: LogRecord,
        timestamp: DateTime<Utc>,
        source_file: &Path,
        line_number: usize,
        project_path: Option<String>,
    ) -> Built {
        let Some(message) = record.message else {
            return Built::Empty;
        };
        let (Some(role), Some(content)) = (message.role, message.content) else {
            return Built::Empty;
        };

        let normalized = content.normalize();
        let text = normalized.text.trim().to_string();

        // Coarse capture: the whole text, not just the matched span
        let errors =
            if contains_error_signature(&text) { vec![text.clone()] } else { Vec::new() };

        if text.is_empty() && normalized.tool_uses.is_empty() && errors.is_empty() {
            return Built::Empty;
        }

        if let Some(reason) = self.exclusion.check(&text, role) {
            return Built::Excluded(reason);
        }

        Built::Candidate(Candidate {
            timestamp: Some(timestamp),
            role,
            text,
            tool_uses: normalized.tool_uses,
            errors,
            source_file: Some(source_file.to_path_buf()),
            line_number: Some(line_number),
            project_path,
        })
    }
}

enum Built {
    Candidate(Candidate),
    Excluded(String),
    Empty,
}

/// Write candidates as a pretty-printed JSON array
pub fn write_candidates(path: &Path, candidates: &[Candidate]) -> Result<()> {
    let json = serde_json::to_string_pretty(candidates).context("Failed to serialize candidates")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write candidates file: {}", path.display()))
}

/// Read a JSON array of candidates
pub fn read_candidates(path: &Path) -> Result<Vec<Candidate>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read candidates file: {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse candidates file: {}", path.display()))
}
