//! Strongly typed pipeline configuration
//!
//! Four YAML files drive extraction, scoring and categorization:
//!
//! - `categories.yaml` - category keyword tables and the default category
//! - `exclusion_patterns.yaml` - minimum length, excluded roles, named regex groups
//! - `scoring_rules.yaml` - positive/negative rules, role weights, thresholds, length bonus
//! - `tool_classifications.yaml` - per-tool scores and tool combination bonuses
//!
//! Everything is parsed and validated once at startup. Regexes are compiled at
//! load time, so a bad pattern or a missing key is a [`ConfigError`] before any
//! candidate is touched.

pub mod error;
pub mod rules;

use std::fs;
use std::path::Path;

pub use error::ConfigError;
pub use rules::{
    Category, CategoryRules, ComboCondition, ExclusionRules, LengthBonus, NegativeRule,
    PatternGroup, PositiveMatcher, PositiveRule, ScoringRules, Thresholds, ToolCombination,
    ToolRules,
};

pub const CATEGORIES_FILE: &str = "categories.yaml";
pub const EXCLUSION_FILE: &str = "exclusion_patterns.yaml";
pub const SCORING_FILE: &str = "scoring_rules.yaml";
pub const TOOLS_FILE: &str = "tool_classifications.yaml";

const BUNDLED_CATEGORIES: &str = include_str!("../../config/categories.yaml");
const BUNDLED_EXCLUSION: &str = include_str!("../../config/exclusion_patterns.yaml");
const BUNDLED_SCORING: &str = include_str!("../../config/scoring_rules.yaml");
const BUNDLED_TOOLS: &str = include_str!("../../config/tool_classifications.yaml");

/// Raw YAML sources for the four configuration files
#[derive(Debug, Clone, Copy)]
pub struct ConfigSources<'a> {
    pub categories: &'a str,
    pub exclusion: &'a str,
    pub scoring: &'a str,
    pub tools: &'a str,
}

/// Loaded configuration, passed by reference into every pipeline stage
#[derive(Debug, Clone)]
pub struct Config {
    pub categories: CategoryRules,
    pub exclusion: ExclusionRules,
    pub scoring: ScoringRules,
    pub tools: ToolRules,
}

impl Config {
    /// Load configuration from a directory containing the four YAML files
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            let path = dir.join(name);
            fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })
        };

        let categories = read(CATEGORIES_FILE)?;
        let exclusion = read(EXCLUSION_FILE)?;
        let scoring = read(SCORING_FILE)?;
        let tools = read(TOOLS_FILE)?;

        Self::from_sources(ConfigSources {
            categories: &categories,
            exclusion: &exclusion,
            scoring: &scoring,
            tools: &tools,
        })
    }

    /// Configuration shipped with the binary (the repository's `config/` directory)
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_sources(ConfigSources {
            categories: BUNDLED_CATEGORIES,
            exclusion: BUNDLED_EXCLUSION,
            scoring: BUNDLED_SCORING,
            tools: BUNDLED_TOOLS,
        })
    }

    /// Parse and validate configuration from in-memory YAML sources
    pub fn from_sources(sources: ConfigSources<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            categories: CategoryRules::compile(parse(CATEGORIES_FILE, sources.categories)?)?,
            exclusion: ExclusionRules::compile(parse(EXCLUSION_FILE, sources.exclusion)?)?,
            scoring: ScoringRules::compile(parse(SCORING_FILE, sources.scoring)?)?,
            tools: ToolRules::compile(parse(TOOLS_FILE, sources.tools)?)?,
        })
    }
}

fn parse<T: serde::de::DeserializeOwned>(file: &str, source: &str) -> Result<T, ConfigError> {
    serde_yaml::from_str(source)
        .map_err(|source| ConfigError::Parse { file: file.to_string(), source })
}
