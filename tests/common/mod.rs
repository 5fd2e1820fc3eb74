//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use knowledge_sync::Config;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Builder for a Claude projects directory holding session logs
pub struct ProjectsDirBuilder {
    temp_dir: TempDir,
}

impl ProjectsDirBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    /// Get the path to the projects directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add `<project>/<session>.jsonl` with one line per record
    pub fn with_session(self, project: &str, session: &str, lines: &[LogLineBuilder]) -> Self {
        let content = lines.iter().map(|l| l.to_json()).collect::<Vec<_>>().join("\n");
        self.with_raw_session(project, session, &content)
    }

    /// Add a session file with raw content (for malformed input)
    pub fn with_raw_session(self, project: &str, session: &str, content: &str) -> Self {
        self.with_session_bytes(project, session, content.as_bytes())
    }

    /// Add a session file with arbitrary bytes (for non-UTF-8 input)
    pub fn with_session_bytes(self, project: &str, session: &str, content: &[u8]) -> Self {
        let project_dir = self.temp_dir.path().join(project);
        fs::create_dir_all(&project_dir).expect("Failed to create project dir");
        fs::write(project_dir.join(format!("{}.jsonl", session)), content)
            .expect("Failed to write session file");
        self
    }

    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

/// Builder for one conversation log line
#[derive(Clone)]
pub struct LogLineBuilder {
    timestamp: Option<String>,
    role: String,
    text: String,
    tools: Vec<String>,
    cwd: Option<String>,
}

impl LogLineBuilder {
    pub fn new(role: &str, timestamp: &str, text: &str) -> Self {
        Self {
            timestamp: Some(timestamp.to_string()),
            role: role.to_string(),
            text: text.to_string(),
            tools: Vec::new(),
            cwd: None,
        }
    }

    pub fn assistant(timestamp: &str, text: &str) -> Self {
        Self::new("assistant", timestamp, text)
    }

    pub fn user(timestamp: &str, text: &str) -> Self {
        Self::new("user", timestamp, text)
    }

    pub fn with_tools(mut self, tools: &[&str]) -> Self {
        self.tools = tools.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_cwd(mut self, cwd: &str) -> Self {
        self.cwd = Some(cwd.to_string());
        self
    }

    pub fn to_json(&self) -> String {
        let mut blocks = vec![json!({"type": "text", "text": self.text})];
        for (i, tool) in self.tools.iter().enumerate() {
            blocks.push(json!({
                "type": "tool_use",
                "id": format!("toolu_{}", i),
                "name": tool,
                "input": {}
            }));
        }

        let mut record = json!({
            "type": self.role,
            "message": {"role": self.role, "content": blocks},
        });
        if let Some(ts) = &self.timestamp {
            record["timestamp"] = Value::String(ts.clone());
        }
        if let Some(cwd) = &self.cwd {
            record["cwd"] = Value::String(cwd.clone());
        }
        record.to_string()
    }
}

/// Builder for a knowledge repository with category directories
pub struct KnowledgeRepoBuilder {
    temp_dir: TempDir,
}

impl KnowledgeRepoBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn with_document(self, category: &str, filename: &str, content: &str) -> Self {
        let dir = self.temp_dir.path().join(category);
        fs::create_dir_all(&dir).expect("Failed to create category dir");
        fs::write(dir.join(filename), content).expect("Failed to write document");
        self
    }

    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

pub const CATEGORIES_YAML: &str = r#"
default_category: domain
categories:
  - name: errors
    keywords: [error, exception, traceback]
  - name: ops
    keywords: [deploy, docker, kubernetes]
  - name: domain
    keywords: [business, invoice]
"#;

pub const EXCLUSION_YAML: &str = r#"
min_text_length: 20
excluded_roles: [system]
exclusion_patterns:
  - name: system_markers
    patterns: ["<system-reminder>"]
"#;

pub const SCORING_YAML: &str = r#"
positive_scores: []
negative_scores: []
role_weights: {}
thresholds:
  accept: 10
  maybe: 3
length_bonus:
  optimal_min: 500
  optimal_max: 1000
  bonus: 2
  too_short: 30
  too_long: 2000
  penalty: -1
"#;

/// Builder for a configuration directory with the four YAML files.
/// Tool scores default to `Edit: 5` with no combinations.
pub struct ConfigDirBuilder {
    temp_dir: TempDir,
    tool_scores: String,
}

impl ConfigDirBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir, tool_scores: "  Edit: 5\n".to_string() }
    }

    /// Replace the tool score table, one `  Name: score` line per tool
    pub fn with_tool_scores(mut self, scores: &[(&str, i64)]) -> Self {
        self.tool_scores =
            scores.iter().map(|(name, score)| format!("  {}: {}\n", name, score)).collect();
        self
    }

    pub fn build(self) -> TempDir {
        let dir = self.temp_dir.path();
        fs::write(dir.join("categories.yaml"), CATEGORIES_YAML).expect("write categories");
        fs::write(dir.join("exclusion_patterns.yaml"), EXCLUSION_YAML).expect("write exclusion");
        fs::write(dir.join("scoring_rules.yaml"), SCORING_YAML).expect("write scoring");
        fs::write(
            dir.join("tool_classifications.yaml"),
            format!("tool_scores:\n{}tool_combinations: []\n", self.tool_scores),
        )
        .expect("write tools");
        self.temp_dir
    }
}

/// Load a config built by [`ConfigDirBuilder`]
pub fn load_config(dir: &TempDir) -> Config {
    Config::load(dir.path()).expect("Test config should load")
}

/// Neutral 41-character text: clears min length, no rule or keyword matches
pub const NEUTRAL_TEXT: &str = "The configuration was updated for the app";
