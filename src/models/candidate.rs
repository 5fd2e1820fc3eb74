use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::role::Role;

/// A tool invocation recorded in an assistant message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub input: Value,
}

impl ToolUse {
    pub fn named(name: &str) -> Self {
        Self { name: Some(name.to_string()), input: Value::Null }
    }
}

/// A log record that survived pre-filtering and is eligible for scoring
///
/// Candidates round-trip through JSON between `extract` and `process`, so
/// everything except the text defaults when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(
        default,
        deserialize_with = "crate::parsers::deserializers::deserialize_optional_timestamp"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tool_uses: Vec<ToolUse>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub source_file: Option<PathBuf>,
    #[serde(default)]
    pub line_number: Option<usize>,
    #[serde(default)]
    pub project_path: Option<String>,
}

impl Candidate {
    /// Minimal candidate for scoring
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            timestamp: None,
            role,
            text: text.into(),
            tool_uses: Vec::new(),
            errors: Vec::new(),
            source_file: None,
            line_number: None,
            project_path: None,
        }
    }

    pub fn with_tools(mut self, names: &[&str]) -> Self {
        self.tool_uses.extend(names.iter().map(|n| ToolUse::named(n)));
        self
    }

    /// Distinct, non-empty tool names in first-use order
    pub fn tool_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.tool_uses
            .iter()
            .filter_map(|t| t.name.as_deref())
            .filter(|name| !name.is_empty())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    pub fn source_display(&self) -> String {
        self.source_file.as_ref().map(|p| p.display().to_string()).unwrap_or_default()
    }
}
