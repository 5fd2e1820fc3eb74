//! Rule-based candidate scoring
//!
//! Evaluation runs in a fixed order, each step feeding the next:
//!
//! 1. exclusion check (short-circuits with score 0 / reject)
//! 2. positive rules (pattern or tool rules, each counted at most once)
//! 3. negative rules (pattern rules, each counted at most once)
//! 4. tool scores per distinct tool, plus combination bonuses
//! 5. length classification (optimal / too short / too long / neutral)
//! 6. role weight, truncated toward zero
//!
//! The decision is then a pure function of the final score and the configured
//! thresholds.

pub mod summary;

pub use summary::EvaluationSummary;

use crate::config::{ComboCondition, Config, PositiveMatcher};
use crate::models::{Candidate, Decision, EvaluationResult};

/// Scores candidates against the loaded configuration
pub struct Evaluator<'a> {
    config: &'a Config,
}

impl<'a> Evaluator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, candidate: &Candidate) -> EvaluationResult {
        let text = candidate.text.as_str();

        if let Some(reason) = self.config.exclusion.check(text, candidate.role) {
            return EvaluationResult::excluded(reason);
        }

        let tool_names = candidate.tool_names();
        let mut score = 0i64;
        let mut reasons = Vec::new();

        score += self.positive_score(text, &tool_names, &mut reasons);
        score += self.negative_score(text, &mut reasons);
        score += self.tool_score(&tool_names, &mut reasons);
        score += self.length_score(text, &mut reasons);

        let weight = self.config.scoring.role_weight(candidate.role);
        let score = (score as f64 * weight).trunc() as i64;
        if weight != 1.0 {
            reasons.push(format!("Role weight ({}): {}x", candidate.role, weight));
        }

        let thresholds = self.config.scoring.thresholds;
        EvaluationResult {
            score,
            decision: Decision::from_score(score, thresholds.accept, thresholds.maybe),
            reasons,
            excluded_by: None,
        }
    }

    fn positive_score(&self, text: &str, tool_names: &[&str], reasons: &mut Vec<String>) -> i64 {
        let mut score = 0;
        for rule in &self.config.scoring.positive {
            match &rule.matcher {
                PositiveMatcher::Patterns(patterns) => {
                    if patterns.iter().any(|p| p.is_match(text)) {
                        score += rule.score;
                        reasons.push(format!("{:+} ({})", rule.score, rule.name));
                    }
                }
                PositiveMatcher::Tools(tools) => {
                    if let Some(tool) = tools.iter().find(|t| tool_names.contains(&t.as_str())) {
                        score += rule.score;
                        reasons.push(format!("{:+} ({}: {})", rule.score, rule.name, tool));
                    }
                }
            }
        }
        score
    }

    fn negative_score(&self, text: &str, reasons: &mut Vec<String>) -> i64 {
        let mut score = 0;
        for rule in &self.config.scoring.negative {
            if rule.patterns.iter().any(|p| p.is_match(text)) {
                score += rule.score;
                reasons.push(format!("{:+} ({})", rule.score, rule.name));
            }
        }
        score
    }

    fn tool_score(&self, tool_names: &[&str], reasons: &mut Vec<String>) -> i64 {
        if tool_names.is_empty() {
            return 0;
        }

        let tools = &self.config.tools;
        let mut score = 0;

        for name in tool_names {
            let tool_score = tools.score_for(name);
            if tool_score != 0 {
                score += tool_score;
                reasons.push(format!("{:+} (tool: {})", tool_score, name));
            }
        }

        for combo in &tools.combinations {
            let applies = match &combo.condition {
                ComboCondition::AllOf(required) => {
                    required.iter().all(|t| tool_names.contains(&t.as_str()))
                }
                ComboCondition::MinDistinct(n) => tool_names.len() >= *n,
            };
            if applies {
                score += combo.bonus;
                reasons.push(format!("{:+} (combo: {})", combo.bonus, combo.name));
            }
        }

        score
    }

    fn length_score(&self, text: &str, reasons: &mut Vec<String>) -> i64 {
        let lb = self.config.scoring.length_bonus;
        let length = text.chars().count();

        if (lb.optimal_min..=lb.optimal_max).contains(&length) {
            reasons.push(format!("{:+} (optimal length)", lb.bonus));
            lb.bonus
        } else if length < lb.too_short {
            reasons.push(format!("{:+} (too short: {} chars)", lb.penalty, length));
            lb.penalty
        } else if length > lb.too_long {
            reasons.push(format!("{:+} (too long: {} chars)", lb.penalty, length));
            lb.penalty
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigSources;
    use crate::models::Role;

    const CATEGORIES: &str = r#"
default_category: domain
categories:
  - name: domain
    keywords: [model]
"#;

    const EXCLUSION: &str = r#"
min_text_length: 20
excluded_roles: [system]
exclusion_patterns:
  - name: system_markers
    patterns: ["<system-reminder>"]
"#;

    const SCORING: &str = r#"
positive_scores:
  - name: root_cause
    score: 5
    patterns: ["root cause", "because"]
  - name: file_changes
    score: 2
    tools: [Write, MultiEdit]
negative_scores:
  - name: uncertainty
    score: -3
    patterns: ["\\bmaybe\\b", "^not sure"]
role_weights:
  user: 0.5
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

    const TOOLS: &str = r#"
tool_scores:
  Edit: 5
  Read: 0
  Bash: 1
  TodoWrite: -2
tool_combinations:
  - name: read_then_edit
    tools: [Read, Edit]
    bonus: 3
  - name: many_tools
    min_tools: 3
    bonus: 1
"#;

    fn config() -> Config {
        Config::from_sources(ConfigSources {
            categories: CATEGORIES,
            exclusion: EXCLUSION,
            scoring: SCORING,
            tools: TOOLS,
        })
        .unwrap()
    }

    // 41 chars of neutral text: above too_short, below optimal_min
    const NEUTRAL: &str = "The configuration was updated for the app";

    #[test]
    fn test_single_tool_scores_maybe() {
        let config = config();
        let evaluator = Evaluator::new(&config);
        let candidate = Candidate::new(Role::Assistant, NEUTRAL).with_tools(&["Edit"]);

        let result = evaluator.evaluate(&candidate);
        assert_eq!(result.score, 5);
        assert_eq!(result.decision, Decision::Maybe);
        assert_eq!(result.reasons, vec!["+5 (tool: Edit)"]);
        assert!(result.excluded_by.is_none());
    }

    #[test]
    fn test_exclusion_overrides_all_scoring() {
        let config = config();
        let evaluator = Evaluator::new(&config);
        // Matches the positive pattern and uses high-value tools, but is too short
        let candidate =
            Candidate::new(Role::Assistant, "root cause").with_tools(&["Edit", "Read", "Write"]);

        let result = evaluator.evaluate(&candidate);
        assert_eq!(result.score, 0);
        assert_eq!(result.decision, Decision::Reject);
        assert_eq!(result.excluded_by.as_deref(), Some("Text too short (< 20 chars)"));
    }

    #[test]
    fn test_excluded_role_and_pattern() {
        let config = config();
        let evaluator = Evaluator::new(&config);

        let system = Candidate::new(Role::System, NEUTRAL);
        assert_eq!(evaluator.evaluate(&system).excluded_by.as_deref(), Some("Excluded role: system"));

        let marker = Candidate::new(Role::Assistant, "<system-reminder> the root cause is here");
        let result = evaluator.evaluate(&marker);
        assert_eq!(result.excluded_by.as_deref(), Some("Matched exclusion: system_markers"));
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_rules_count_once() {
        let config = config();
        let evaluator = Evaluator::new(&config);
        let text = "The root cause was found because the root cause was logged";
        let candidate = Candidate::new(Role::Assistant, text).with_tools(&["Write", "MultiEdit"]);

        let result = evaluator.evaluate(&candidate);
        // root_cause once (+5), file_changes once (+2); no tool scores configured for these
        assert_eq!(result.score, 7);
        assert!(result.reasons.contains(&"+2 (file_changes: Write)".to_string()));
    }

    #[test]
    fn test_negative_rules_use_multiline() {
        let config = config();
        let evaluator = Evaluator::new(&config);
        let text = "Looked at the logs today.\nnot sure this is the fix";

        let result = evaluator.evaluate(&Candidate::new(Role::Assistant, text));
        assert_eq!(result.score, -3);
        assert_eq!(result.reasons, vec!["-3 (uncertainty)"]);
    }

    #[test]
    fn test_duplicate_tools_scored_once() {
        let config = config();
        let evaluator = Evaluator::new(&config);
        let candidate = Candidate::new(Role::Assistant, NEUTRAL).with_tools(&["Edit", "Edit", "Edit"]);

        assert_eq!(evaluator.evaluate(&candidate).score, 5);
    }

    #[test]
    fn test_tool_combinations() {
        let config = config();
        let evaluator = Evaluator::new(&config);
        let candidate =
            Candidate::new(Role::Assistant, NEUTRAL).with_tools(&["Read", "Edit", "TodoWrite"]);

        let result = evaluator.evaluate(&candidate);
        // Edit +5, TodoWrite -2, read_then_edit +3, many_tools +1
        assert_eq!(result.score, 7);
        assert!(result.reasons.contains(&"-2 (tool: TodoWrite)".to_string()));
        assert!(result.reasons.contains(&"+3 (combo: read_then_edit)".to_string()));
        assert!(result.reasons.contains(&"+1 (combo: many_tools)".to_string()));
    }

    #[test]
    fn test_length_classification() {
        let config = config();
        let evaluator = Evaluator::new(&config);

        let short = "a".repeat(25);
        assert_eq!(evaluator.evaluate(&Candidate::new(Role::Assistant, short)).score, -1);

        let optimal = "a".repeat(500);
        assert_eq!(evaluator.evaluate(&Candidate::new(Role::Assistant, optimal)).score, 2);

        let long = "a".repeat(2001);
        assert_eq!(evaluator.evaluate(&Candidate::new(Role::Assistant, long)).score, -1);

        let neutral = "a".repeat(1500);
        assert_eq!(evaluator.evaluate(&Candidate::new(Role::Assistant, neutral)).score, 0);
    }

    #[test]
    fn test_role_weight_truncates_toward_zero() {
        let config = config();
        let evaluator = Evaluator::new(&config);

        let candidate = Candidate::new(Role::User, NEUTRAL).with_tools(&["Edit", "Bash", "Grep"]);
        // 5 + 1 + 0 + many_tools 1 = 7, * 0.5 = 3.5 -> 3
        let result = evaluator.evaluate(&candidate);
        assert_eq!(result.score, 3);
        assert_eq!(result.decision, Decision::Maybe);
        assert_eq!(result.reasons.last().unwrap(), "Role weight (user): 0.5x");

        let negative = Candidate::new(Role::User, "not sure about this one at all");
        // -3 * 0.5 = -1.5 -> -1
        assert_eq!(evaluator.evaluate(&negative).score, -1);
    }

    #[test]
    fn test_adding_positive_tool_never_decreases_score() {
        let config = config();
        let evaluator = Evaluator::new(&config);
        let base = Candidate::new(Role::Assistant, NEUTRAL).with_tools(&["Read"]);
        let more = base.clone().with_tools(&["Edit"]);

        assert!(evaluator.evaluate(&more).score >= evaluator.evaluate(&base).score);
    }

    #[test]
    fn test_accept_decision() {
        let config = config();
        let evaluator = Evaluator::new(&config);
        let candidate = Candidate::new(Role::Assistant, "The root cause was a missing index")
            .with_tools(&["Read", "Edit"]);

        // root_cause 5 + Edit 5 + read_then_edit 3
        let result = evaluator.evaluate(&candidate);
        assert_eq!(result.score, 13);
        assert_eq!(result.decision, Decision::Accept);
    }
}
