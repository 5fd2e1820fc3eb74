use crate::models::{Decision, EvaluationResult};

/// Aggregate statistics over a set of evaluation results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationSummary {
    pub total: usize,
    pub accept: usize,
    pub maybe: usize,
    pub reject: usize,
    pub min_score: Option<i64>,
    pub max_score: Option<i64>,
    pub average_score: Option<f64>,
}

impl EvaluationSummary {
    pub fn from_results(results: &[EvaluationResult]) -> Self {
        let count = |d: Decision| results.iter().filter(|r| r.decision == d).count();
        let scores = results.iter().map(|r| r.score);

        Self {
            total: results.len(),
            accept: count(Decision::Accept),
            maybe: count(Decision::Maybe),
            reject: count(Decision::Reject),
            min_score: scores.clone().min(),
            max_score: scores.clone().max(),
            average_score: if results.is_empty() {
                None
            } else {
                Some(scores.sum::<i64>() as f64 / results.len() as f64)
            },
        }
    }

    /// Share of `count` in the total, as a percentage
    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 { 0.0 } else { count as f64 / self.total as f64 * 100.0 }
    }
}
