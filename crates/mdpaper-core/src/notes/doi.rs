use once_cell::sync::Lazy;
use regex::Regex;

/// DOI grammar shared by PDF text and note lines.
pub static DOI_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)10\.\d{4,9}/[-._;()/:A-Z0-9]+").expect("valid regex"));

const TRAILING_PUNCTUATION: &[char] = &[')', '.', ',', ';'];

/// Lowercase and strip trailing `).,;`. Returns `None` for blank input.
pub fn normalize_doi(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches(TRAILING_PUNCTUATION);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// First DOI in `text`, normalized.
pub fn find_doi(text: &str) -> Option<String> {
    DOI_REGEX
        .find(text)
        .and_then(|m| normalize_doi(m.as_str()))
}
