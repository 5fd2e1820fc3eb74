//! Category assignment and knowledge file persistence

pub mod filename;
pub mod store;

pub use filename::{generate_filename, sanitize_filename};
pub use store::KnowledgeStore;

use crate::config::CategoryRules;

/// Points a matching tag adds to a category
pub const TAG_BONUS: usize = 5;

/// Picks one category for a text using the configured keyword tables
pub struct Categorizer<'a> {
    rules: &'a CategoryRules,
}

impl<'a> Categorizer<'a> {
    pub fn new(rules: &'a CategoryRules) -> Self {
        Self { rules }
    }

    /// Score every category and return the winner.
    ///
    /// Each keyword contributes its occurrence count in the lowercased text. A
    /// tag equal to one of a category's keywords, or contained in the category
    /// name, adds [`TAG_BONUS`]. The strictly highest score wins, so ties go
    /// to the category declared first. No signal at all yields the default.
    pub fn categorize(&self, text: &str, tags: Option<&[String]>) -> &'a str {
        let scores = self.scores(text, tags);

        let mut best: Option<(usize, usize)> = None;
        for (idx, &score) in scores.iter().enumerate() {
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((idx, score));
            }
        }

        match best {
            Some((idx, score)) if score > 0 => &self.rules.categories[idx].name,
            _ => &self.rules.default_category,
        }
    }

    /// Per-category scores in declaration order
    pub fn scores(&self, text: &str, tags: Option<&[String]>) -> Vec<usize> {
        let text_lower = text.to_lowercase();
        let tags: Vec<String> = tags
            .unwrap_or_default()
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        self.rules
            .categories
            .iter()
            .map(|category| {
                let keyword_hits: usize =
                    category.keywords.iter().map(|k| text_lower.matches(k.as_str()).count()).sum();

                let name = category.name.to_lowercase();
                let tag_hits = tags
                    .iter()
                    .filter(|tag| category.keywords.contains(tag) || name.contains(tag.as_str()))
                    .count();

                keyword_hits + tag_hits * TAG_BONUS
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Category, CategoryRules};

    fn rules() -> CategoryRules {
        let category = |name: &str, keywords: &[&str]| Category {
            name: name.to_string(),
            description: String::new(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        };
        CategoryRules {
            default_category: "domain".to_string(),
            categories: vec![
                category("errors", &["error", "exception", "traceback"]),
                category("ops", &["deploy", "docker", "ci"]),
                category("domain", &["business", "model"]),
            ],
        }
    }

    #[test]
    fn test_no_signal_returns_default() {
        let rules = rules();
        let categorizer = Categorizer::new(&rules);
        assert_eq!(categorizer.categorize("Nothing relevant here at all", None), "domain");
        assert_eq!(categorizer.categorize("", Some(&[])), "domain");
    }

    #[test]
    fn test_keyword_occurrences_are_counted() {
        let rules = rules();
        let categorizer = Categorizer::new(&rules);
        let text = "Deploy failed with an Error; redeploy, deploy again";

        // ops: "deploy" x3 ; errors: "error" x1
        assert_eq!(categorizer.scores(text, None), vec![1, 3, 0]);
        assert_eq!(categorizer.categorize(text, None), "ops");
    }

    #[test]
    fn test_exact_keyword_tag_beats_smaller_keyword_lead() {
        let rules = rules();
        let categorizer = Categorizer::new(&rules);
        // errors leads ops by 3 on keywords alone
        let text = "error error error error deploy-free text";
        assert_eq!(categorizer.categorize(text, None), "errors");

        let tags = vec!["docker".to_string()];
        assert_eq!(categorizer.categorize(text, Some(&tags)), "ops");
    }

    #[test]
    fn test_tag_contained_in_category_name() {
        let rules = rules();
        let categorizer = Categorizer::new(&rules);
        let tags = vec!["Err".to_string()];
        assert_eq!(categorizer.scores("plain text", Some(&tags)), vec![5, 0, 0]);
    }

    #[test]
    fn test_tie_goes_to_first_declared() {
        let rules = rules();
        let categorizer = Categorizer::new(&rules);
        assert_eq!(categorizer.categorize("an exception during deploy", None), "errors");
    }
}
