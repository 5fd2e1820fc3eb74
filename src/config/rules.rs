//! Raw YAML shapes and their compiled, validated counterparts.
//!
//! The `Raw*` types mirror the files on disk one-to-one. The compiled types
//! hold pre-built regexes and are what the evaluator, extractor and
//! categorizer consume.

use std::collections::{HashMap, HashSet};

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use super::error::ConfigError;
use crate::models::Role;

// ---------------------------------------------------------------------------
// categories.yaml
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct RawCategories {
    pub default_category: String,
    pub categories: Vec<RawCategory>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawCategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub keywords: Vec<String>,
}

/// A knowledge base partition with its lowercased keyword phrases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub description: String,
    pub keywords: Vec<String>,
}

/// Ordered category table plus the zero-signal fallback
#[derive(Debug, Clone)]
pub struct CategoryRules {
    pub default_category: String,
    pub categories: Vec<Category>,
}

impl CategoryRules {
    pub(crate) fn compile(raw: RawCategories) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        let mut categories = Vec::with_capacity(raw.categories.len());

        for category in raw.categories {
            let name = category.name.trim().to_string();
            if name.is_empty() {
                return Err(ConfigError::Invalid("category name cannot be empty".to_string()));
            }
            if name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(ConfigError::Invalid(format!(
                    "category name '{}' is not a valid directory name",
                    name
                )));
            }
            if !seen.insert(name.clone()) {
                return Err(ConfigError::Invalid(format!("duplicate category '{}'", name)));
            }

            let keywords = category
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();

            categories.push(Category { name, description: category.description, keywords });
        }

        if !seen.contains(raw.default_category.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "default_category '{}' is not a declared category",
                raw.default_category
            )));
        }

        Ok(Self { default_category: raw.default_category, categories })
    }

    /// Category names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }
}

// ---------------------------------------------------------------------------
// exclusion_patterns.yaml
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct RawExclusion {
    pub min_text_length: usize,
    pub excluded_roles: Vec<Role>,
    pub exclusion_patterns: Vec<RawPatternGroup>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPatternGroup {
    pub name: String,
    pub patterns: Vec<String>,
}

/// A named list of compiled patterns; matches when any pattern is found
#[derive(Debug, Clone)]
pub struct PatternGroup {
    pub name: String,
    pub patterns: Vec<Regex>,
}

impl PatternGroup {
    pub fn is_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }
}

/// Terminal pre-filter shared by the extractor and the evaluator
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    pub min_text_length: usize,
    pub excluded_roles: Vec<Role>,
    pub groups: Vec<PatternGroup>,
}

impl ExclusionRules {
    pub(crate) fn compile(raw: RawExclusion) -> Result<Self, ConfigError> {
        let groups = raw
            .exclusion_patterns
            .into_iter()
            .map(|g| {
                let patterns = compile_all(&g.patterns, &g.name, false)?;
                Ok(PatternGroup { name: g.name, patterns })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { min_text_length: raw.min_text_length, excluded_roles: raw.excluded_roles, groups })
    }

    /// Returns the reason the text is excluded, or `None` if it passes.
    ///
    /// Checks run in a fixed order: minimum length, excluded role, then the
    /// pattern groups in declaration order. The first hit wins.
    pub fn check(&self, text: &str, role: Role) -> Option<String> {
        if text.chars().count() < self.min_text_length {
            return Some(format!("Text too short (< {} chars)", self.min_text_length));
        }

        if self.excluded_roles.contains(&role) {
            return Some(format!("Excluded role: {}", role));
        }

        self.groups
            .iter()
            .find(|group| group.is_match(text))
            .map(|group| format!("Matched exclusion: {}", group.name))
    }
}

// ---------------------------------------------------------------------------
// scoring_rules.yaml
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct RawScoring {
    pub positive_scores: Vec<RawPositiveRule>,
    pub negative_scores: Vec<RawNegativeRule>,
    #[serde(default)]
    pub role_weights: HashMap<Role, f64>,
    pub thresholds: Thresholds,
    pub length_bonus: LengthBonus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPositiveRule {
    pub name: String,
    pub score: i64,
    #[serde(default)]
    pub patterns: Option<Vec<String>>,
    #[serde(default)]
    pub tools: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawNegativeRule {
    pub name: String,
    pub score: i64,
    pub patterns: Vec<String>,
}

/// Score cut-offs for the accept/maybe/reject split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Thresholds {
    pub accept: i64,
    pub maybe: i64,
}

/// Length classification bounds, in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LengthBonus {
    pub optimal_min: usize,
    pub optimal_max: usize,
    pub bonus: i64,
    pub too_short: usize,
    pub too_long: usize,
    pub penalty: i64,
}

#[derive(Debug, Clone)]
pub enum PositiveMatcher {
    /// Any of these patterns found in the text
    Patterns(Vec<Regex>),
    /// Any of these tool names used
    Tools(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct PositiveRule {
    pub name: String,
    pub score: i64,
    pub matcher: PositiveMatcher,
}

#[derive(Debug, Clone)]
pub struct NegativeRule {
    pub name: String,
    pub score: i64,
    pub patterns: Vec<Regex>,
}

#[derive(Debug, Clone)]
pub struct ScoringRules {
    pub positive: Vec<PositiveRule>,
    pub negative: Vec<NegativeRule>,
    pub role_weights: HashMap<Role, f64>,
    pub thresholds: Thresholds,
    pub length_bonus: LengthBonus,
}

impl ScoringRules {
    pub(crate) fn compile(raw: RawScoring) -> Result<Self, ConfigError> {
        let Thresholds { accept, maybe } = raw.thresholds;
        if accept <= maybe {
            return Err(ConfigError::Invalid(format!(
                "thresholds.accept ({}) must be greater than thresholds.maybe ({})",
                accept, maybe
            )));
        }

        let lb = raw.length_bonus;
        if !(lb.too_short <= lb.optimal_min
            && lb.optimal_min <= lb.optimal_max
            && lb.optimal_max <= lb.too_long)
        {
            return Err(ConfigError::Invalid(format!(
                "length_bonus bounds overlap: expected too_short ({}) <= optimal_min ({}) <= optimal_max ({}) <= too_long ({})",
                lb.too_short, lb.optimal_min, lb.optimal_max, lb.too_long
            )));
        }

        for (role, weight) in &raw.role_weights {
            if !weight.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "role weight for '{}' must be a finite number",
                    role
                )));
            }
        }

        let positive = raw
            .positive_scores
            .into_iter()
            .map(|rule| {
                let matcher = match (rule.patterns, rule.tools) {
                    (Some(patterns), None) => {
                        PositiveMatcher::Patterns(compile_all(&patterns, &rule.name, false)?)
                    }
                    (None, Some(tools)) => PositiveMatcher::Tools(tools),
                    _ => {
                        return Err(ConfigError::Invalid(format!(
                            "positive rule '{}' must define exactly one of `patterns` or `tools`",
                            rule.name
                        )));
                    }
                };
                Ok(PositiveRule { name: rule.name, score: rule.score, matcher })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let negative = raw
            .negative_scores
            .into_iter()
            .map(|rule| {
                let patterns = compile_all(&rule.patterns, &rule.name, true)?;
                Ok(NegativeRule { name: rule.name, score: rule.score, patterns })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            positive,
            negative,
            role_weights: raw.role_weights,
            thresholds: raw.thresholds,
            length_bonus: lb,
        })
    }

    /// Multiplier for a role, 1.0 when unconfigured
    pub fn role_weight(&self, role: Role) -> f64 {
        self.role_weights.get(&role).copied().unwrap_or(1.0)
    }
}

// ---------------------------------------------------------------------------
// tool_classifications.yaml
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct RawTools {
    pub tool_scores: HashMap<String, i64>,
    #[serde(default)]
    pub tool_combinations: Vec<RawToolCombination>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawToolCombination {
    pub name: String,
    #[serde(default)]
    pub tools: Option<Vec<String>>,
    #[serde(default)]
    pub min_tools: Option<usize>,
    pub bonus: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComboCondition {
    /// Every listed tool was used
    AllOf(Vec<String>),
    /// At least this many distinct tools were used
    MinDistinct(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCombination {
    pub name: String,
    pub bonus: i64,
    pub condition: ComboCondition,
}

#[derive(Debug, Clone)]
pub struct ToolRules {
    pub tool_scores: HashMap<String, i64>,
    pub combinations: Vec<ToolCombination>,
}

impl ToolRules {
    pub(crate) fn compile(raw: RawTools) -> Result<Self, ConfigError> {
        let combinations = raw
            .tool_combinations
            .into_iter()
            .map(|combo| {
                let condition = match (combo.tools, combo.min_tools) {
                    (Some(tools), None) => ComboCondition::AllOf(tools),
                    (None, Some(n)) => ComboCondition::MinDistinct(n),
                    _ => {
                        return Err(ConfigError::Invalid(format!(
                            "tool combination '{}' must define exactly one of `tools` or `min_tools`",
                            combo.name
                        )));
                    }
                };
                Ok(ToolCombination { name: combo.name, bonus: combo.bonus, condition })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { tool_scores: raw.tool_scores, combinations })
    }

    pub fn score_for(&self, tool: &str) -> i64 {
        self.tool_scores.get(tool).copied().unwrap_or(0)
    }
}

fn compile_all(patterns: &[String], rule: &str, multi_line: bool) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .multi_line(multi_line)
                .build()
                .map_err(|source| ConfigError::Regex { rule: rule.to_string(), source })
        })
        .collect()
}
