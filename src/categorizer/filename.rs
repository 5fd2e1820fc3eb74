use once_cell::sync::Lazy;
use regex::Regex;

const SLUG_MAX: usize = 50;
const SANITIZED_MAX: usize = 100;

static NON_ASCII: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\x00-\x7F]+").expect("Valid non-ASCII regex"));
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").expect("Valid non-word regex"));
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_]+").expect("Valid separator regex"));
static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9-]").expect("Valid slug regex"));
static HYPHENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("Valid hyphen regex"));
static INVALID_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\:*?"<>|]"#).expect("Valid filename regex"));

/// `<date>_<slug>.md` for a knowledge record.
///
/// An explicit slug is reduced to lowercase alphanumerics and hyphens.
/// Otherwise the slug comes from the title: non-ASCII dropped, lowercased,
/// punctuation removed, whitespace and underscores turned into hyphens.
/// Either way the slug is capped at 50 characters, and an empty result
/// becomes `untitled`.
pub fn generate_filename(title: &str, date: &str, slug: Option<&str>) -> String {
    let slug = match slug.filter(|s| !s.trim().is_empty()) {
        Some(provided) => {
            let cleaned = NON_SLUG.replace_all(&provided.to_lowercase(), "").into_owned();
            collapse_hyphens(&cleaned)
        }
        None => {
            let ascii = NON_ASCII.replace_all(title, "").to_lowercase();
            let cleaned = NON_WORD.replace_all(&ascii, "");
            let hyphenated = SEPARATORS.replace_all(&cleaned, "-");
            collapse_hyphens(&hyphenated)
        }
    };

    // Slug is pure ASCII here, so byte truncation is char-safe
    let mut slug = slug;
    slug.truncate(SLUG_MAX);
    if slug.is_empty() {
        slug = "untitled".to_string();
    }

    format!("{}_{}.md", date, slug)
}

fn collapse_hyphens(s: &str) -> String {
    HYPHENS.replace_all(s, "-").trim_matches('-').to_string()
}

/// Title made safe for use as a file stem: path and shell-reserved characters
/// replaced with `_`, at most 100 characters.
pub fn sanitize_filename(title: &str) -> String {
    let replaced = INVALID_FILENAME_CHARS.replace_all(title, "_");
    let truncated: String = replaced.chars().take(SANITIZED_MAX).collect();
    let trimmed = truncated.trim();
    if trimmed.is_empty() { "untitled".to_string() } else { trimmed.to_string() }
}
