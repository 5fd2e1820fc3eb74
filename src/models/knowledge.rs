use std::path::PathBuf;

use serde::Serialize;

/// A persisted unit of the knowledge base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeRecord {
    pub title: String,
    pub category: String,
    pub tags: Vec<String>,
    pub body: String,
    /// Extra front-matter entries, written in order
    pub metadata: Vec<(String, String)>,
}

impl KnowledgeRecord {
    /// Render as markdown with a `---` front-matter header
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.body.len() + 256);
        out.push_str("---\n");
        out.push_str(&format!("title: {}\n", self.title));
        out.push_str(&format!("category: {}\n", self.category));
        if !self.tags.is_empty() {
            out.push_str(&format!("tags: [{}]\n", self.tags.join(", ")));
        }
        for (key, value) in &self.metadata {
            out.push_str(&format!("{}: {}\n", key, value));
        }
        out.push_str("---\n\n");
        out.push_str(&format!("# {}\n\n{}\n", self.title, self.body));
        out
    }
}

/// A heading-delimited section of a markdown document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub text: String,
}

/// An existing section found to be a near-duplicate of a query text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarMatch {
    pub file: PathBuf,
    pub section: String,
    pub similarity: f64,
    pub text_preview: String,
}
