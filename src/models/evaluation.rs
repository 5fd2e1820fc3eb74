use serde::{Deserialize, Serialize};

/// Three-way bucket produced by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Maybe,
    Reject,
}

impl Decision {
    /// Pure function of the final score and the two thresholds
    pub fn from_score(score: i64, accept: i64, maybe: i64) -> Self {
        if score >= accept {
            Decision::Accept
        } else if score >= maybe {
            Decision::Maybe
        } else {
            Decision::Reject
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accept => "accept",
            Decision::Maybe => "maybe",
            Decision::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub score: i64,
    pub decision: Decision,
    pub reasons: Vec<String>,
    pub excluded_by: Option<String>,
}

impl EvaluationResult {
    pub fn excluded(reason: String) -> Self {
        Self {
            score: 0,
            decision: Decision::Reject,
            reasons: vec![format!("Excluded by: {}", reason)],
            excluded_by: Some(reason),
        }
    }
}

/// A decision about one candidate, produced outside this tool (e.g. by a
/// reviewer), used by the `create` entrypoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationDecision {
    #[serde(default)]
    pub index: Option<usize>,
    pub decision: Decision,
    pub category: String,
    pub title: String,
}
