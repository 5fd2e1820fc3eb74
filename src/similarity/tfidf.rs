//! Pairwise TF-IDF cosine similarity
//!
//! Each comparison fits its own two-document vocabulary, so scores are only
//! meaningful for the pair they were computed on.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;

use super::stopwords::is_stop_word;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("Valid token regex"));

/// Lowercased tokens of two or more word characters, stop words removed
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect()
}

fn term_counts(tokens: &[String]) -> HashMap<&str, f64> {
    let mut counts = HashMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0.0) += 1.0;
    }
    counts
}

/// Cosine similarity of the smoothed TF-IDF vectors of `a` and `b`.
///
/// Returns `None` when neither text has a single vocabulary term, so the
/// caller can fall back to another measure.
pub fn tfidf_cosine(a: &str, b: &str) -> Option<f64> {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    if tokens_a.is_empty() && tokens_b.is_empty() {
        return None;
    }

    let tf_a = term_counts(&tokens_a);
    let tf_b = term_counts(&tokens_b);

    // Ordered vocabulary keeps the float summation order stable
    let mut vocabulary: BTreeMap<&str, f64> = BTreeMap::new();
    for term in tf_a.keys().chain(tf_b.keys()) {
        vocabulary.entry(term).or_insert_with(|| {
            let df = tf_a.contains_key(term) as u8 + tf_b.contains_key(term) as u8;
            // idf = ln((1 + n) / (1 + df)) + 1 with n = 2 documents
            (3.0 / (1.0 + df as f64)).ln() + 1.0
        });
    }

    let weights = |tf: &HashMap<&str, f64>| -> Vec<f64> {
        vocabulary.iter().map(|(term, idf)| tf.get(term).copied().unwrap_or(0.0) * idf).collect()
    };
    let va = weights(&tf_a);
    let vb = weights(&tf_b);

    let norm_a = va.iter().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b = vb.iter().map(|w| w * w).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Some(0.0);
    }

    let dot: f64 = va.iter().zip(&vb).map(|(x, y)| x * y).sum();
    Some((dot / (norm_a * norm_b)).clamp(0.0, 1.0))
}
